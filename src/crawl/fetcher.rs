//! Page fetching capability
//!
//! The crawler and the repair pass both talk to a `PageFetcher` trait rather
//! than reqwest directly, so they can be exercised with fakes in tests. The
//! HTTP implementation keeps an on-disk page cache; the repair pass re-fetches
//! with `CachePolicy::Bypass` to get fresh content.

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::models::deterministic_id;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether a fetch may be served from the page cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Enabled,
    Bypass,
}

/// A successfully fetched page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub body: String,
    pub content_type: Option<String>,
}

/// Fetch capability used by the crawler and the repair pass
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, cache: CachePolicy) -> Result<FetchedPage>;
}

/// reqwest-backed fetcher with an optional on-disk page cache
pub struct HttpFetcher {
    client: Client,
    cache_dir: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig, cache_dir: Option<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Crawl(format!("Failed to create HTTP client: {}", e)))?;

        if let Some(dir) = &cache_dir {
            std::fs::create_dir_all(dir)?;
        }

        Ok(Self { client, cache_dir })
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", deterministic_id("PageCache", url))))
    }

    fn read_cache(&self, url: &str) -> Option<FetchedPage> {
        let path = self.cache_path(url)?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write_cache(&self, url: &str, page: &FetchedPage) {
        let Some(path) = self.cache_path(url) else {
            return;
        };
        match serde_json::to_string(page) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("Failed to write page cache {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize cached page for {}: {}", url, e),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cache: CachePolicy) -> Result<FetchedPage> {
        if cache == CachePolicy::Enabled {
            if let Some(page) = self.read_cache(url) {
                debug!("Cache hit: {}", url);
                return Ok(page);
            }
        }

        debug!("Fetching: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Crawl(format!("HTTP {}: {}", status, url)));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        let page = FetchedPage {
            url: final_url,
            body,
            content_type,
        };
        self.write_cache(url, &page);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CrawlConfig {
        CrawlConfig {
            timeout_secs: 5,
            user_agent: "docdex-test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_caches_and_bypasses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("first".as_bytes().to_vec(), "text/plain"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("second".as_bytes().to_vec(), "text/plain"),
            )
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new(&test_config(), Some(tmp.path().to_path_buf())).unwrap();
        let url = format!("{}/page", server.uri());

        let a = fetcher.fetch(&url, CachePolicy::Enabled).await.unwrap();
        assert_eq!(a.body, "first");

        // Cached: body unchanged even though the server now answers differently
        let b = fetcher.fetch(&url, CachePolicy::Enabled).await.unwrap();
        assert_eq!(b.body, "first");

        // Bypass goes back to the network
        let c = fetcher.fetch(&url, CachePolicy::Bypass).await.unwrap();
        assert_eq!(c.body, "second");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config(), None).unwrap();
        let url = format!("{}/missing", server.uri());
        let err = fetcher.fetch(&url, CachePolicy::Enabled).await;
        assert!(err.is_err());
    }
}
