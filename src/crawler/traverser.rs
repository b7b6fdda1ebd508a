//! Sitemap traversal
//!
//! This module turns one root sitemap-index location into a flat list of
//! [`UrlRecord`]. Traversal is a two-level recursion: the index references
//! leaf sitemaps, and each leaf sitemap contributes URL records. Failures on
//! individual documents are counted and logged, never fatal; the crawl
//! always runs to completion.
//!
//! Requests are strictly sequential, with a configurable minimum delay
//! between successive fetches.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_document};
use crate::crawler::parser::{parse_sitemap_document, SitemapDocument, UrlEntry};
use crate::{ConfigError, CrawlError, SweepError};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// One extracted page URL with its sitemap metadata
///
/// Created exactly once per accepted `<url>` entry; immutable once built.
/// Optional fields stay `None` when the source element omits them and render
/// as empty CSV fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlRecord {
    /// The page URL from `<loc>`
    pub url: String,

    /// `<lastmod>` text, if present
    pub last_modified: Option<String>,

    /// `<changefreq>` text, if present
    pub change_frequency: Option<String>,

    /// `<priority>` text, if present
    pub priority: Option<String>,

    /// Label of the sitemap document this record was found in
    pub source_sitemap: String,
}

/// Counters accumulated over one crawl run
///
/// Each counter only ever increases during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Documents successfully fetched and parsed (index included)
    pub sitemaps_visited: u64,

    /// URL records extracted
    pub urls_found: u64,

    /// Documents or elements skipped due to transport, parse, or
    /// missing-loc failures
    pub errors: u64,
}

/// Walks a sitemap index and collects URL records from every referenced
/// sitemap
pub struct SitemapTraverser {
    client: Client,
    base_url: Option<Url>,
    delay: Duration,
    last_fetch: Option<Instant>,
    stats: CrawlStats,
}

impl SitemapTraverser {
    /// Creates a traverser from the run configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration (base URL, delay, user agent)
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapTraverser)` - Ready to crawl
    /// * `Err(SweepError)` - The base URL or delay is invalid, or the HTTP
    ///   client could not be built
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        let client = build_http_client(&config.user_agent)?;

        let base_url = match &config.crawler.base_url {
            Some(raw) => Some(Url::parse(raw)?),
            None => None,
        };

        let delay = Duration::try_from_secs_f64(config.crawler.delay).map_err(|e| {
            ConfigError::Validation(format!("invalid delay {}: {}", config.crawler.delay, e))
        })?;

        Ok(Self {
            client,
            base_url,
            delay,
            last_fetch: None,
            stats: CrawlStats::default(),
        })
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Crawls a sitemap index and every sitemap it references
    ///
    /// If the index location turns out to be a leaf sitemap, it is crawled
    /// directly as a single-sitemap run. Any failure along the way costs one
    /// error in the statistics and skips only the affected document or
    /// element.
    ///
    /// # Arguments
    ///
    /// * `index_url` - URL or local path of the sitemap index; relative
    ///   values resolve against the configured base URL
    ///
    /// # Returns
    ///
    /// The extracted records in traversal order, plus the run statistics.
    pub async fn crawl_sitemap_index(&mut self, index_url: &str) -> (Vec<UrlRecord>, CrawlStats) {
        self.stats = CrawlStats::default();

        let location = match self.resolve(index_url) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Skipping index: {}", e);
                self.stats.errors += 1;
                return (Vec::new(), self.stats.clone());
            }
        };

        tracing::info!("Starting crawl from: {}", location);

        let document = match self.load_document(&location).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Error processing {}: {}", location, e);
                self.stats.errors += 1;
                return (Vec::new(), self.stats.clone());
            }
        };
        self.stats.sitemaps_visited += 1;

        let records = match document {
            SitemapDocument::UrlSet(entries) => {
                tracing::info!("Processing as regular sitemap");
                self.collect_records(entries, &source_label(&location))
            }
            SitemapDocument::Index(entries) => {
                tracing::info!("Found {} sitemaps to process", entries.len());
                let mut records = Vec::new();
                for entry in entries {
                    let Some(loc) = entry.loc else {
                        tracing::warn!(
                            "{}",
                            CrawlError::MissingLoc {
                                element: "sitemap".to_string(),
                                document: location.clone(),
                            }
                        );
                        self.stats.errors += 1;
                        continue;
                    };

                    match self.resolve(&loc) {
                        Ok(sitemap_location) => {
                            let extracted = self.crawl_sitemap(&sitemap_location).await;
                            tracing::info!(
                                "Extracted {} URLs from {}",
                                extracted.len(),
                                source_label(&sitemap_location)
                            );
                            records.extend(extracted);
                        }
                        Err(e) => {
                            tracing::warn!("Skipping sitemap reference: {}", e);
                            self.stats.errors += 1;
                        }
                    }
                }
                records
            }
        };

        (records, self.stats.clone())
    }

    /// Crawls one leaf sitemap document
    ///
    /// A document that fails to fetch or parse contributes zero records and
    /// one error. A nested sitemap index encountered here is not descended
    /// into; the sitemap protocol convention is a two-level index-to-sitemap
    /// tree, so a deeper index is reported as an error instead of being
    /// followed.
    ///
    /// # Arguments
    ///
    /// * `sitemap_url` - Resolved URL or local path of the sitemap
    pub async fn crawl_sitemap(&mut self, sitemap_url: &str) -> Vec<UrlRecord> {
        let document = match self.load_document(sitemap_url).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Error processing {}: {}", sitemap_url, e);
                self.stats.errors += 1;
                return Vec::new();
            }
        };
        self.stats.sitemaps_visited += 1;

        match document {
            SitemapDocument::UrlSet(entries) => {
                self.collect_records(entries, &source_label(sitemap_url))
            }
            SitemapDocument::Index(_) => {
                tracing::warn!(
                    "Nested sitemap index at {} is not supported, skipping",
                    sitemap_url
                );
                self.stats.errors += 1;
                Vec::new()
            }
        }
    }

    /// Resolves a document reference to a fetchable location
    ///
    /// Absolute HTTP(S) references pass through unchanged; anything else is
    /// joined onto the base URL when one is configured, and otherwise
    /// treated as a local path.
    fn resolve(&self, reference: &str) -> Result<String, CrawlError> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }

        match &self.base_url {
            Some(base) => base
                .join(reference)
                .map(|url| url.to_string())
                .map_err(|e| CrawlError::Transport {
                    url: reference.to_string(),
                    message: format!("could not resolve against base URL: {}", e),
                }),
            None => Ok(reference.to_string()),
        }
    }

    /// Fetches and parses one document, enforcing the inter-request delay
    async fn load_document(&mut self, location: &str) -> Result<SitemapDocument, CrawlError> {
        self.throttle().await;

        tracing::debug!("Fetching: {}", location);
        let body = fetch_document(&self.client, location).await?;
        self.last_fetch = Some(Instant::now());

        parse_sitemap_document(&body).map_err(|e| CrawlError::Parse {
            url: location.to_string(),
            message: e.to_string(),
        })
    }

    /// Sleeps long enough to keep `delay` between successive fetches
    async fn throttle(&mut self) {
        if let Some(last) = self.last_fetch {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
    }

    /// Turns parsed `<url>` entries into records, counting missing-loc
    /// entries as errors
    fn collect_records(&mut self, entries: Vec<UrlEntry>, source: &str) -> Vec<UrlRecord> {
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(loc) = entry.loc else {
                tracing::warn!(
                    "{}",
                    CrawlError::MissingLoc {
                        element: "url".to_string(),
                        document: source.to_string(),
                    }
                );
                self.stats.errors += 1;
                continue;
            };

            self.stats.urls_found += 1;
            records.push(UrlRecord {
                url: loc,
                last_modified: entry.lastmod,
                change_frequency: entry.changefreq,
                priority: entry.priority,
                source_sitemap: source.to_string(),
            });
        }
        records
    }
}

/// Short label for a sitemap document: the final path segment of its
/// location, falling back to the whole location when there is none
pub fn source_label(location: &str) -> &str {
    location
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(location)
}
