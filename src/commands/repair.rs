//! Repair command implementation

use crate::config::Config;
use crate::crawl::HttpFetcher;
use crate::error::{Error, Result};
use crate::repair::{repair_crawl_result, RepairStats};
use crate::snapshot::{list_snapshots, processed_snapshot_path, raw_snapshot_path, read_snapshot, write_snapshot};
use serde::Serialize;
use tracing::info;

/// Outcome of repairing one job's snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RepairSummary {
    pub job: String,
    pub stats: RepairStats,
}

/// Validate and repair raw snapshots, writing processed snapshots.
///
/// Repair re-fetches flagged pages with the cache bypassed, so a page served
/// stale from the crawl cache gets one fresh chance.
pub async fn cmd_repair(config: &Config, job: Option<&str>) -> Result<Vec<RepairSummary>> {
    let targets: Vec<String> = match job {
        Some(name) => {
            config.job(name)?;
            let path = raw_snapshot_path(&config.paths.crawled_dir, name);
            if !path.exists() {
                return Err(Error::Snapshot(format!(
                    "No raw snapshot for job '{}'. Run 'docdex crawl --job {}' first.",
                    name, name
                )));
            }
            vec![name.to_string()]
        }
        None => list_snapshots(&config.paths.crawled_dir)?
            .into_iter()
            .map(|(name, _)| name)
            .collect(),
    };

    let fetcher = HttpFetcher::new(&config.crawl, Some(config.paths.cache_dir.clone()))?;
    let mut summaries = Vec::with_capacity(targets.len());

    for name in targets {
        let raw = read_snapshot(&raw_snapshot_path(&config.paths.crawled_dir, &name))?;
        info!("Repairing '{}' ({} pages)", name, raw.len());

        let (repaired, stats) = repair_crawl_result(&fetcher, &raw).await;
        write_snapshot(
            &processed_snapshot_path(&config.paths.processed_dir, &name),
            &repaired,
        )?;

        summaries.push(RepairSummary { job: name, stats });
    }

    Ok(summaries)
}

/// Print repair results to console
pub fn print_repair_summary(summaries: &[RepairSummary]) {
    println!("\n✓ Repair complete\n");
    for s in summaries {
        println!(
            "  {:12} {} pages, {} problematic, {} repaired, {} unresolved",
            s.job,
            s.stats.total,
            s.stats.problematic,
            s.stats.repaired,
            s.stats.unresolved.len()
        );
        for url in &s.stats.unresolved {
            println!("    ! {}", url);
        }
    }
}
