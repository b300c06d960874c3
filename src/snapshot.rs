//! Crawl snapshot files
//!
//! Snapshots are the boundary between the crawl and index stages: one JSON
//! object per job, top-level keys = URLs, values = extracted text. Raw
//! snapshots are named `<job>_crawl4ai.json`; repaired snapshots drop the
//! suffix and live in a separate directory.

use crate::error::{Error, Result};
use crate::models::CrawlResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix carried by raw (pre-repair) snapshot file stems
pub const RAW_SNAPSHOT_SUFFIX: &str = "_crawl4ai";

/// Path of the raw snapshot for a job
pub fn raw_snapshot_path(dir: &Path, job_name: &str) -> PathBuf {
    dir.join(format!("{}{}.json", job_name, RAW_SNAPSHOT_SUFFIX))
}

/// Path of the processed (repaired) snapshot for a job
pub fn processed_snapshot_path(dir: &Path, job_name: &str) -> PathBuf {
    dir.join(format!("{}.json", job_name))
}

/// Job name encoded in a snapshot file name
pub fn job_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_suffix(RAW_SNAPSHOT_SUFFIX).unwrap_or(stem).to_string())
}

/// Write a snapshot, replacing any previous one for the job
pub fn write_snapshot(path: &Path, result: &CrawlResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)?;
    debug!("Wrote snapshot {} ({} pages)", path.display(), result.len());
    Ok(())
}

/// Read a snapshot file
pub fn read_snapshot(path: &Path) -> Result<CrawlResult> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Snapshot(format!("Cannot read snapshot {}: {}", path.display(), e))
    })?;
    let result = serde_json::from_str(&content).map_err(|e| {
        Error::Snapshot(format!("Malformed snapshot {}: {}", path.display(), e))
    })?;
    Ok(result)
}

/// All snapshot files in a directory, as (job name, path) pairs sorted by
/// job name.
pub fn list_snapshots(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    if !dir.exists() {
        return Ok(out);
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Some(name) = job_name_from_path(&path) {
                out.push((name, path));
            }
        }
    }
    out.sort();
    Ok(out)
}
