//! docdex CLI entry point

use clap::{Parser, Subcommand};
use docdex::{
    commands::{
        cmd_crawl, cmd_fetch, cmd_index, cmd_init, cmd_repair, cmd_search_chunks,
        cmd_search_documents, cmd_status, print_chunk_results, print_crawl_summary,
        print_document_results, print_fetch_result, print_index_summary, print_init_summary,
        print_repair_summary, print_status,
    },
    config::Config,
    embed::create_embedder,
    error::Result,
    mcp::McpServer,
    progress::LogWriterFactory,
    store::QdrantStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docdex")]
#[command(version, about = "Vector database documentation crawler and search index", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docdex configuration and data directories
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Crawl documentation sites into raw snapshots
    Crawl {
        /// Only crawl one job (product name)
        #[arg(short, long)]
        job: Option<String>,
    },

    /// Validate raw snapshots and re-fetch broken pages
    Repair {
        /// Only repair one job (product name)
        #[arg(short, long)]
        job: Option<String>,
    },

    /// Embed snapshots and upsert them into Qdrant
    Index {
        /// Only index one job (product name)
        #[arg(short, long)]
        job: Option<String>,

        /// Index raw snapshots instead of repaired ones
        #[arg(long)]
        raw: bool,
    },

    /// Search the documentation index
    Search {
        /// The search query
        query: String,

        /// Restrict results to one product
        #[arg(short, long)]
        product: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Search whole documents instead of chunks
        #[arg(long)]
        documents: bool,
    },

    /// Fetch the full text of one indexed document by URL
    Fetch {
        /// Exact URL of the document
        path: String,
    },

    /// Show system status
    Status,

    /// Manage Qdrant collections
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Start MCP server on stdio
    Mcp,
}

/// Database management actions
#[derive(Subcommand)]
enum DbAction {
    /// Create the Qdrant collections
    Init,

    /// Show Qdrant collection status
    Status,

    /// Reset both collections (delete all vectors and recreate)
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    // Init does not need an existing config
    if let Commands::Init { force } = &cli.command {
        let force = *force;
        let base_dir = cli.config.as_deref().and_then(|p| {
            if p.extension().map_or(false, |e| e == "toml") {
                p.parent().map(PathBuf::from)
            } else {
                Some(p.to_path_buf())
            }
        });
        let config = cmd_init(base_dir, force).await?;
        print_init_summary(&config);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Crawl { job } => {
            let summaries = cmd_crawl(&config, job.as_deref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_crawl_summary(&summaries);
            }
        }

        Commands::Repair { job } => {
            let summaries = cmd_repair(&config, job.as_deref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_repair_summary(&summaries);
            }
        }

        Commands::Index { job, raw } => {
            let store = QdrantStore::connect(&config).await?;
            let embedder = create_embedder(&config.embedding)?;
            let summaries =
                cmd_index(&config, &store, embedder.as_ref(), job.as_deref(), raw).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_index_summary(&summaries);
            }
        }

        Commands::Search {
            query,
            product,
            limit,
            documents,
        } => {
            let store = QdrantStore::connect(&config).await?;
            let embedder = create_embedder(&config.embedding)?;
            let limit = limit.unwrap_or(config.query.default_limit);

            if documents {
                let results = cmd_search_documents(
                    &config,
                    &store,
                    embedder.as_ref(),
                    &query,
                    product.as_deref(),
                    limit,
                )
                .await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    print_document_results(&results);
                }
            } else {
                let results = cmd_search_chunks(
                    &config,
                    &store,
                    embedder.as_ref(),
                    &query,
                    product.as_deref(),
                    limit,
                )
                .await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    print_chunk_results(&results);
                }
            }
        }

        Commands::Fetch { path } => {
            let store = QdrantStore::connect(&config).await?;
            let doc = cmd_fetch(&store, &path).await?;
            if cli.json {
                match &doc {
                    Some(doc) => println!("{}", serde_json::to_string_pretty(doc)?),
                    None => println!("{}", serde_json::json!({ "found": false, "path": path })),
                }
            } else {
                print_fetch_result(&path, doc.as_ref());
            }
        }

        Commands::Status => {
            let status = cmd_status(&config).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Db { action } => {
            handle_db_action(&config, action, cli.json).await?;
        }

        Commands::Mcp => {
            let store = QdrantStore::connect(&config).await?;
            let embedder = create_embedder(&config.embedding)?;
            let server = McpServer::new(config, store, embedder);
            server
                .run()
                .await
                .map_err(|e| docdex::error::Error::McpProtocol(e.to_string()))?;
        }
    }

    Ok(())
}

async fn handle_db_action(config: &Config, action: DbAction, json: bool) -> Result<()> {
    let store = QdrantStore::connect(config).await?;

    match action {
        DbAction::Init => {
            store.ensure_collections().await?;
            if json {
                println!(r#"{{"status": "ok", "message": "Collections initialized"}}"#);
            } else {
                println!("✓ Qdrant collections initialized");
            }
        }
        DbAction::Status => {
            let infos = store.collection_infos().await?;
            if json {
                let entries: Vec<_> = infos
                    .iter()
                    .map(|i| {
                        serde_json::json!({
                            "name": i.name,
                            "points_count": i.points_count,
                            "status": i.status
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if infos.is_empty() {
                println!("Collections do not exist. Run 'docdex db init' to create them.");
            } else {
                println!("Qdrant collections:");
                for info in infos {
                    println!("  {} [{}]: {} points", info.name, info.status, info.points_count);
                }
            }
        }
        DbAction::Reset { yes } => {
            if !yes {
                eprintln!("This will delete ALL indexed data!");
                eprintln!("Run with --yes to confirm.");
                std::process::exit(1);
            }
            store.reset_collections().await?;
            if json {
                println!(r#"{{"status": "ok", "message": "Collections reset"}}"#);
            } else {
                println!("✓ Qdrant collections reset (all data deleted and recreated)");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'docdex init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}
