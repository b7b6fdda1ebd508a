//! Statistics reporting for a completed crawl
//!
//! This module summarizes a crawl run: overall counters plus per-domain and
//! per-source-sitemap breakdowns of the extracted records.

use crate::crawler::{CrawlStats, UrlRecord};
use std::collections::BTreeMap;
use url::Url;

/// Counts records by the host of their URL
///
/// Records whose URL does not parse or has no host are grouped under
/// `(unknown)`.
pub fn domain_breakdown(records: &[UrlRecord]) -> BTreeMap<String, u64> {
    let mut domains = BTreeMap::new();
    for record in records {
        let domain = Url::parse(&record.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "(unknown)".to_string());
        *domains.entry(domain).or_insert(0) += 1;
    }
    domains
}

/// Counts records by the sitemap document they were found in
pub fn source_breakdown(records: &[UrlRecord]) -> BTreeMap<String, u64> {
    let mut sources = BTreeMap::new();
    for record in records {
        *sources.entry(record.source_sitemap.clone()).or_insert(0) += 1;
    }
    sources
}

/// Prints crawl statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `records` - The extracted records
/// * `stats` - The run counters
pub fn print_statistics(records: &[UrlRecord], stats: &CrawlStats) {
    println!("\n=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Sitemaps visited: {}", stats.sitemaps_visited);
    println!("  Total URLs: {}", stats.urls_found);
    println!("  Errors: {}", stats.errors);

    if records.is_empty() {
        return;
    }

    println!("\nDomain breakdown:");
    for (domain, count) in domain_breakdown(records) {
        println!("  {}: {} URLs", domain, count);
    }

    println!("\nSource sitemap breakdown:");
    for (source, count) in source_breakdown(records) {
        println!("  {}: {} URLs", source, count);
    }
}
