//! URL filtering for crawl jobs
//!
//! A filter chain of a domain allow-list plus optional glob-style URL
//! patterns (OR-combined). Links failing either stage are never queued.

use crate::error::{Error, Result};
use crate::models::CrawlJob;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Compiled per-job URL filter
#[derive(Debug)]
pub struct UrlFilter {
    allowed_hosts: HashSet<String>,
    patterns: Vec<Regex>,
}

impl UrlFilter {
    /// Build the filter for a job. An empty allow-list falls back to the
    /// seed URL's host.
    pub fn for_job(job: &CrawlJob) -> Result<Self> {
        let mut allowed_hosts: HashSet<String> = job.allowed_domains.iter().cloned().collect();
        if allowed_hosts.is_empty() {
            let seed = Url::parse(&job.start_url)?;
            let host = seed
                .host_str()
                .ok_or_else(|| Error::Crawl(format!("Seed URL has no host: {}", job.start_url)))?;
            allowed_hosts.insert(host.to_string());
        }

        let patterns = job
            .url_patterns
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            allowed_hosts,
            patterns,
        })
    }

    /// Whether a discovered link may be queued
    pub fn allows(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if !self.allowed_hosts.contains(host) {
            return false;
        }

        if self.patterns.is_empty() {
            return true;
        }
        let as_str = url.as_str();
        self.patterns.iter().any(|re| re.is_match(as_str))
    }
}

/// Translate a glob pattern (`*` = any run of characters) into an anchored
/// regex over the full URL string.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    // Patterns without a leading wildcard or scheme match anywhere in the URL
    if !pattern.starts_with('*') && !pattern.contains("://") {
        re.push_str(".*");
    }
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| Error::Crawl(format!("Invalid URL pattern '{}': {}", pattern, e)))
}

/// Normalize a URL for visited-set deduplication: drop fragments and
/// trailing slashes.
pub fn normalize_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        let mut normalized = parsed.clone();
        normalized.set_fragment(None);

        let path = parsed.path().trim_end_matches('/');
        if path.is_empty() {
            normalized.set_path("/");
        } else {
            normalized.set_path(path);
        }

        normalized.to_string()
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with(domains: &[&str], patterns: &[&str]) -> CrawlJob {
        CrawlJob::new("test", domains, "https://example.com/docs", patterns)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_domain_allow_list() {
        let filter = UrlFilter::for_job(&job_with(&["example.com"], &[])).unwrap();
        assert!(filter.allows(&url("https://example.com/docs/intro")));
        assert!(!filter.allows(&url("https://other.com/docs/intro")));
    }

    #[test]
    fn test_empty_domains_fall_back_to_seed_host() {
        let filter = UrlFilter::for_job(&job_with(&[], &[])).unwrap();
        assert!(filter.allows(&url("https://example.com/anything")));
        assert!(!filter.allows(&url("https://external.com/anything")));
    }

    #[test]
    fn test_patterns_or_combined() {
        let filter = UrlFilter::for_job(&job_with(
            &["milvus.io"],
            &["*/docs/*", "*/api-reference/pymilvus/*"],
        ))
        .unwrap();
        assert!(filter.allows(&url("https://milvus.io/docs/install")));
        assert!(filter.allows(&url("https://milvus.io/api-reference/pymilvus/Collection")));
        assert!(!filter.allows(&url("https://milvus.io/blog/announcement")));
    }

    #[test]
    fn test_pattern_without_wildcard_prefix() {
        let filter = UrlFilter::for_job(&job_with(
            &["raw.githubusercontent.com"],
            &["*pgvector/pgvector/refs/heads/master/README.md"],
        ))
        .unwrap();
        assert!(filter.allows(&url(
            "https://raw.githubusercontent.com/pgvector/pgvector/refs/heads/master/README.md"
        )));
        assert!(!filter.allows(&url("https://raw.githubusercontent.com/pgvector/pgvector/pull/1")));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://example.com/path/"),
            "https://example.com/path"
        );
        assert_eq!(
            normalize_url("https://example.com/path#fragment"),
            "https://example.com/path"
        );
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }
}
