//! Sitemap-Sweep: a sitemap-to-CSV extractor
//!
//! This crate fetches an XML sitemap index, visits every sitemap it
//! references, and exports the per-URL metadata (lastmod, changefreq,
//! priority) to a CSV file.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Sitemap-Sweep operations
///
/// These are the process-fatal failures: bad configuration, inability to
/// write the output file, failure to construct the HTTP client. Per-document
/// crawl failures are [`CrawlError`] and never abort a run.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced while parsing one sitemap document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML: unexpected end of document")]
    UnexpectedEof,

    #[error("unrecognized root element <{0}>")]
    UnrecognizedRoot(String),

    #[error("document has no root element")]
    Empty,
}

/// Per-document crawl errors
///
/// All variants are handled identically at the point of occurrence: the
/// offending document or element is skipped, one error is tallied in
/// `CrawlStats`, and traversal continues.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("<{element}> entry without <loc> in {document}")]
    MissingLoc { element: String, document: String },
}

/// Result type alias for Sitemap-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlStats, SitemapTraverser, UrlRecord};
pub use output::save_to_csv;
