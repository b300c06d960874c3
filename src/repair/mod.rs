//! Crawl content validation and repair
//!
//! Scans crawl results for pages where extraction failed (bot-challenge
//! interstitials, error pages, truncated content) and gives each flagged URL
//! exactly one cache-bypassing re-fetch. Classification is best-effort and
//! never raises; a failed repair keeps the original text and reports the URL
//! as unresolved.

use crate::crawl::{CachePolicy, PageFetcher};
use crate::models::CrawlResult;
use crate::parse::extract_page;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Content shorter than this (after trimming) is treated as a failed scrape
pub const MIN_CONTENT_LEN: usize = 50;

/// Markers of bot-challenge and error pages, matched case-insensitively
pub const CHALLENGE_MARKERS: &[&str] = &[
    "just a moment",
    "enable javascript and cookies to continue",
    "please enable cookies",
    "checking your browser",
    "access denied",
    "403 forbidden",
    "404 not found",
    "500 internal server error",
    "ray id:",
    "verify you are a human",
    "security check",
    "captcha",
];

/// Whether crawled text looks like a failed or blocked scrape
pub fn is_problematic(content: &str) -> bool {
    if content.trim().is_empty() {
        return true;
    }
    if content.trim().len() < MIN_CONTENT_LEN {
        return true;
    }

    let lower = content.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Outcome of one repair pass over a snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairStats {
    pub total: usize,
    pub problematic: usize,
    pub repaired: usize,
    /// URLs still problematic after their one retry
    pub unresolved: Vec<String>,
}

/// Repair a crawl result: one bypass re-fetch per problematic URL.
///
/// The input is never mutated; the returned map is the repaired copy.
pub async fn repair_crawl_result(
    fetcher: &dyn PageFetcher,
    data: &CrawlResult,
) -> (CrawlResult, RepairStats) {
    let mut stats = RepairStats {
        total: data.len(),
        ..Default::default()
    };

    let problematic: Vec<&String> = data
        .iter()
        .filter(|(_, content)| is_problematic(content))
        .map(|(url, _)| url)
        .collect();
    stats.problematic = problematic.len();

    if problematic.is_empty() {
        debug!("No problematic pages found");
        return (data.clone(), stats);
    }

    info!(
        "Found {} problematic pages out of {}",
        stats.problematic, stats.total
    );

    let mut repaired = data.clone();
    for url in problematic {
        match fetcher.fetch(url, CachePolicy::Bypass).await {
            Ok(page) => {
                let text =
                    extract_page(&page.body, page.content_type.as_deref(), &page.url).text;
                if is_problematic(&text) {
                    warn!("Retry for {} still problematic, keeping original", url);
                    stats.unresolved.push(url.clone());
                } else {
                    repaired.insert(url.clone(), text);
                    stats.repaired += 1;
                }
            }
            Err(e) => {
                warn!("Retry for {} failed: {}, keeping original", url, e);
                stats.unresolved.push(url.clone());
            }
        }
    }

    (repaired, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::FetchedPage;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake fetcher serving canned bodies and counting calls
    struct FakeFetcher {
        responses: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(responses: &[(&str, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, _cache: CachePolicy) -> Result<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(url) {
                Some(body) => Ok(FetchedPage {
                    url: url.to_string(),
                    body: body.clone(),
                    content_type: Some("text/plain".to_string()),
                }),
                None => Err(Error::Crawl(format!("HTTP 404: {}", url))),
            }
        }
    }

    const CLEAN: &str = "A perfectly reasonable documentation page with plenty of real content \
                         describing how to create a collection and insert vectors.";

    #[test]
    fn test_empty_and_short_content_is_problematic() {
        assert!(is_problematic(""));
        assert!(is_problematic("   \n\t "));
        assert!(is_problematic("too short"));
        assert!(!is_problematic(CLEAN));
    }

    #[test]
    fn test_all_challenge_markers_detected_case_insensitively() {
        for marker in CHALLENGE_MARKERS {
            let padding = "x".repeat(MIN_CONTENT_LEN);
            let content = format!("{} {} {}", padding, marker.to_uppercase(), padding);
            assert!(is_problematic(&content), "marker not detected: {}", marker);
        }
    }

    #[tokio::test]
    async fn test_clean_snapshot_performs_zero_fetches() {
        let fetcher = FakeFetcher::new(&[]);
        let mut data = CrawlResult::new();
        data.insert("https://example.com/a".to_string(), CLEAN.to_string());

        let (repaired, stats) = repair_crawl_result(&fetcher, &data).await;

        assert_eq!(repaired, data);
        assert_eq!(stats.problematic, 0);
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_problematic_entry_gets_exactly_one_retry() {
        let url = "https://example.com/blocked";
        let fetcher = FakeFetcher::new(&[(url, CLEAN)]);
        let mut data = CrawlResult::new();
        data.insert(url.to_string(), "Just a moment...".to_string());

        let (repaired, stats) = repair_crawl_result(&fetcher, &data).await;

        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(stats.repaired, 1);
        assert!(stats.unresolved.is_empty());
        assert_eq!(repaired[url], CLEAN);
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_original_and_flags() {
        let url = "https://example.com/gone";
        let fetcher = FakeFetcher::new(&[]); // every fetch 404s
        let mut data = CrawlResult::new();
        data.insert(url.to_string(), "Access denied".to_string());

        let (repaired, stats) = repair_crawl_result(&fetcher, &data).await;

        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(stats.repaired, 0);
        assert_eq!(stats.unresolved, vec![url.to_string()]);
        assert_eq!(repaired[url], "Access denied");
    }

    #[tokio::test]
    async fn test_retry_returning_problematic_content_is_unresolved() {
        let url = "https://example.com/still-blocked";
        let fetcher = FakeFetcher::new(&[(url, "Checking your browser before accessing")]);
        let mut data = CrawlResult::new();
        data.insert(url.to_string(), String::new());

        let (repaired, stats) = repair_crawl_result(&fetcher, &data).await;

        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(stats.unresolved.len(), 1);
        assert_eq!(repaired[url], "");
    }
}
