//! Bounded breadth-first crawling
//!
//! One `CrawlJob` = one documentation site. The traversal is breadth-first
//! level by level; fetches within a level run concurrently up to the job's
//! fan-out limit. Individual page failures are logged and skipped, never
//! aborting the job.

mod fetcher;
mod filter;

pub use fetcher::*;
pub use filter::*;

use crate::error::Result;
use crate::models::{CrawlJob, CrawlResult};
use crate::parse::extract_page;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Web crawler over a fetch capability
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Run one job to completion and return the URL -> text mapping.
    pub async fn run(&self, job: &CrawlJob) -> Result<CrawlResult> {
        let url_filter = UrlFilter::for_job(job)?;

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(normalize_url(&job.start_url));

        let mut frontier = vec![job.start_url.clone()];
        let mut result = CrawlResult::new();

        for depth in 0..=job.max_depth {
            if frontier.is_empty() {
                break;
            }
            debug!(
                "Job '{}': depth {}, {} urls in frontier",
                job.name,
                depth,
                frontier.len()
            );

            let fetcher = Arc::clone(&self.fetcher);
            let fetched: Vec<_> = stream::iter(frontier.drain(..))
                .map(|url| {
                    let fetcher = Arc::clone(&fetcher);
                    async move {
                        let outcome = fetcher.fetch(&url, CachePolicy::Enabled).await;
                        (url, outcome)
                    }
                })
                .buffer_unordered(job.concurrency)
                .collect()
                .await;

            let mut next = Vec::new();
            for (url, outcome) in fetched {
                let page = match outcome {
                    Ok(page) => page,
                    Err(e) => {
                        warn!("Failed to fetch {}: {}", url, e);
                        continue;
                    }
                };

                let extracted = extract_page(&page.body, page.content_type.as_deref(), &page.url);

                // Links from the deepest level are never followed
                if depth < job.max_depth {
                    for link in &extracted.links {
                        if !link.is_internal {
                            continue;
                        }
                        let Ok(link_url) = Url::parse(&link.url) else {
                            continue;
                        };
                        if !url_filter.allows(&link_url) {
                            continue;
                        }
                        let normalized = normalize_url(&link.url);
                        if visited.insert(normalized) {
                            next.push(link.url.clone());
                        }
                    }
                }

                result.insert(page.url, extracted.text);
            }

            frontier = next;
        }

        info!(
            "Job '{}': crawled {} pages from {}",
            job.name,
            result.len(),
            job.start_url
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_html(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"),
            )
            .mount(server)
            .await;
    }

    fn crawler() -> Crawler {
        let config = CrawlConfig {
            timeout_secs: 5,
            user_agent: "docdex-test".to_string(),
        };
        Crawler::new(Arc::new(HttpFetcher::new(&config, None).unwrap()))
    }

    fn job_for(server: &MockServer, max_depth: u32) -> crate::models::CrawlJob {
        let host = Url::parse(&server.uri()).unwrap();
        let mut job = crate::models::CrawlJob::new(
            "demo",
            &[host.host_str().unwrap()],
            &format!("{}/docs", server.uri()),
            &[],
        );
        job.max_depth = max_depth;
        job
    }

    #[tokio::test]
    async fn test_crawl_three_page_site_skips_external_links() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/docs",
            r#"<html><body><h1>Intro</h1>
               <a href="/docs/install">Install</a>
               <a href="/docs/query">Query</a>
               <a href="https://elsewhere.example/offsite">Offsite</a>
               </body></html>"#,
        )
        .await;
        mount_html(&server, "/docs/install", "<html><body>Install guide</body></html>").await;
        mount_html(&server, "/docs/query", "<html><body>Query guide</body></html>").await;

        let result = crawler().run(&job_for(&server, 1)).await.unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.keys().all(|u| u.starts_with(&server.uri())));
        let seed_text = &result[&format!("{}/docs", server.uri())];
        assert!(seed_text.contains("Intro"));
    }

    #[tokio::test]
    async fn test_depth_bound_not_exceeded() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/docs",
            r#"<html><body><a href="/docs/a">a</a></body></html>"#,
        )
        .await;
        mount_html(
            &server,
            "/docs/a",
            r#"<html><body><a href="/docs/b">b</a></body></html>"#,
        )
        .await;
        mount_html(&server, "/docs/b", "<html><body>deep</body></html>").await;

        // depth 1: seed + one level of links, /docs/b never fetched
        let result = crawler().run(&job_for(&server, 1)).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.contains_key(&format!("{}/docs/b", server.uri())));
    }

    #[tokio::test]
    async fn test_page_failure_does_not_abort_job() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/docs",
            r#"<html><body>
               <a href="/docs/ok">ok</a>
               <a href="/docs/broken">broken</a>
               </body></html>"#,
        )
        .await;
        mount_html(&server, "/docs/ok", "<html><body>fine</body></html>").await;
        Mock::given(method("GET"))
            .and(path("/docs/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = crawler().run(&job_for(&server, 1)).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.contains_key(&format!("{}/docs/broken", server.uri())));
    }

    #[tokio::test]
    async fn test_url_pattern_restricts_traversal() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/docs",
            r#"<html><body>
               <a href="/docs/keep">keep</a>
               <a href="/blog/skip">skip</a>
               </body></html>"#,
        )
        .await;
        mount_html(&server, "/docs/keep", "<html><body>kept</body></html>").await;
        mount_html(&server, "/blog/skip", "<html><body>skipped</body></html>").await;

        let mut job = job_for(&server, 1);
        job.url_patterns = vec!["*/docs/*".to_string()];
        let result = crawler().run(&job).await.unwrap();

        assert!(result.contains_key(&format!("{}/docs/keep", server.uri())));
        assert!(!result.contains_key(&format!("{}/blog/skip", server.uri())));
    }
}
