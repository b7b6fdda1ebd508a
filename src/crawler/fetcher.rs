//! HTTP fetcher implementation
//!
//! This module handles document retrieval for the traverser, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for sitemap documents
//! - Reading local sitemap files
//! - Error classification
//!
//! The traverser treats every failure here identically (count and continue),
//! so all failure modes collapse into [`CrawlError::Transport`].

use crate::config::UserAgentConfig;
use crate::CrawlError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// The client identifies itself as `crawler-name/crawler-version` and
/// announces an XML preference, since everything it asks for is a sitemap.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_sweep::config::UserAgentConfig;
/// use sitemap_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/xml, text/xml, */*"),
    );

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a document body from an HTTP(S) URL
///
/// Any non-success status and any transport failure (DNS, connection,
/// timeout) map to [`CrawlError::Transport`]; the caller does not
/// distinguish between them beyond logging.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(String)` - The response body
/// * `Err(CrawlError)` - The request failed or returned a non-2xx status
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, CrawlError> {
    let response = client.get(url).send().await.map_err(|e| {
        CrawlError::Transport {
            url: url.to_string(),
            message: classify_request_error(&e),
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Transport {
            url: url.to_string(),
            message: format!("HTTP status {}", status.as_u16()),
        });
    }

    response.text().await.map_err(|e| CrawlError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Fetches a document from either an HTTP(S) URL or a local path
///
/// Locations without an `http://` or `https://` prefix are read from the
/// filesystem, which lets the tool run against a sitemap saved to disk.
pub async fn fetch_document(client: &Client, location: &str) -> Result<String, CrawlError> {
    if is_remote(location) {
        fetch_text(client, location).await
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|e| CrawlError::Transport {
                url: location.to_string(),
                message: e.to_string(),
            })
    }
}

/// Returns true when the location should be fetched over HTTP
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Classifies a reqwest error into a short human-readable message
fn classify_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let config = UserAgentConfig::default();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("http://example.com/sitemap.xml"));
        assert!(is_remote("https://example.com/sitemap.xml"));
        assert!(!is_remote("sitemap.xml"));
        assert!(!is_remote("/var/data/sitemap.xml"));
    }

    #[tokio::test]
    async fn test_fetch_document_local_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<urlset></urlset>").unwrap();
        file.flush().unwrap();

        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        let body = fetch_document(&client, file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(body, "<urlset></urlset>");
    }

    #[tokio::test]
    async fn test_fetch_document_missing_local_file() {
        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        let result = fetch_document(&client, "/nonexistent/sitemap.xml").await;
        assert!(matches!(result, Err(CrawlError::Transport { .. })));
    }
}
