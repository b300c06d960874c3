//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::QdrantStore;
use std::path::PathBuf;
use tracing::{info, warn};

/// Initialize docdex configuration and data directories
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();
    config.init_paths(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    for dir in [
        &config.paths.crawled_dir,
        &config.paths.processed_dir,
        &config.paths.cache_dir,
    ] {
        std::fs::create_dir_all(dir)?;
    }

    // Collection creation is best-effort; Qdrant may not be running yet
    match QdrantStore::connect(&config).await {
        Ok(store) => match store.ensure_collections().await {
            Ok(_) => info!(
                "Qdrant collections '{}' and '{}' ready",
                config.chunks_collection, config.documents_collection
            ),
            Err(e) => {
                warn!("Could not create Qdrant collections: {}. Run 'docdex db init' later.", e);
            }
        },
        Err(e) => {
            warn!(
                "Could not connect to Qdrant at {}: {}. Make sure Qdrant is running.",
                config.qdrant_url, e
            );
        }
    }

    Ok(config)
}

/// Print post-init guidance
pub fn print_init_summary(config: &Config) {
    println!("✓ Initialized docdex at {}", config.paths.base_dir.display());
    println!("\nConfiguration: {}", config.paths.config_file.display());
    println!("Products: {}", config.product_names().join(", "));
    println!("\nNext steps:");
    println!("  docdex crawl                 # Crawl all documentation sites");
    println!("  docdex repair                # Re-fetch pages that failed extraction");
    println!("  docdex index                 # Embed and index into Qdrant");
    println!("  docdex search \"hybrid search\"  # Query the index");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_dirs() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        assert!(config.paths.config_file.exists());
        assert!(config.paths.crawled_dir.exists());
        assert!(config.paths.processed_dir.exists());
        assert!(config.paths.cache_dir.exists());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false).await;
        assert!(matches!(err, Err(Error::Config(_))));

        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).await.is_ok());
    }
}
