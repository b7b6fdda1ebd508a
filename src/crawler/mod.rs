//! Crawler module for sitemap fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of sitemap documents
//! - XML parsing with namespace fallback
//! - Two-level index-to-sitemap traversal with a fixed inter-request delay

mod fetcher;
mod parser;
mod traverser;

pub use fetcher::{build_http_client, fetch_document, fetch_text};
pub use parser::{
    is_sitemap_tag, parse_sitemap_document, IndexEntry, SitemapDocument, UrlEntry, SITEMAP_NS,
};
pub use traverser::{source_label, CrawlStats, SitemapTraverser, UrlRecord};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete crawl against one sitemap index
///
/// This is the main entry point for library users. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Fetch the index and classify it
/// 3. Visit every referenced sitemap, one request at a time
/// 4. Return the extracted records with run statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `index_url` - URL or local path of the sitemap index to crawl
///
/// # Returns
///
/// * `Ok((records, stats))` - Crawl ran to completion (individual document
///   failures are reported in `stats.errors`, not as an `Err`)
/// * `Err(SweepError)` - The traverser could not be constructed
pub async fn crawl(
    config: &Config,
    index_url: &str,
) -> Result<(Vec<UrlRecord>, CrawlStats), SweepError> {
    let mut traverser = SitemapTraverser::new(config)?;
    Ok(traverser.crawl_sitemap_index(index_url).await)
}
