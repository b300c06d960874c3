//! Crawl command implementation

use crate::config::Config;
use crate::crawl::{Crawler, HttpFetcher};
use crate::error::Result;
use crate::models::CrawlJob;
use crate::progress::add_progress_bar;
use crate::snapshot::{raw_snapshot_path, write_snapshot};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Outcome of crawling one job
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub job: String,
    pub pages: usize,
    pub snapshot: PathBuf,
    pub finished_at: String,
}

/// Crawl all jobs, or a single named one, writing raw snapshots
pub async fn cmd_crawl(config: &Config, job: Option<&str>) -> Result<Vec<CrawlSummary>> {
    let jobs: Vec<&CrawlJob> = match job {
        Some(name) => vec![config.job(name)?],
        None => config.jobs.iter().collect(),
    };

    let fetcher = HttpFetcher::new(&config.crawl, Some(config.paths.cache_dir.clone()))?;
    let crawler = Crawler::new(Arc::new(fetcher));

    let bar = add_progress_bar(jobs.len() as u64);
    let mut summaries = Vec::with_capacity(jobs.len());

    for job in jobs {
        bar.set_message(job.name.clone());
        info!("Crawling '{}' from {}", job.name, job.start_url);

        let result = crawler.run(job).await?;
        let path = raw_snapshot_path(&config.paths.crawled_dir, &job.name);
        write_snapshot(&path, &result)?;

        summaries.push(CrawlSummary {
            job: job.name.clone(),
            pages: result.len(),
            snapshot: path,
            finished_at: chrono::Utc::now().to_rfc3339(),
        });
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(summaries)
}

/// Print crawl results to console
pub fn print_crawl_summary(summaries: &[CrawlSummary]) {
    println!("\n✓ Crawl complete\n");
    for s in summaries {
        println!("  {:12} {:5} pages  -> {}", s.job, s.pages, s.snapshot.display());
    }
}
