use anyhow::Context;
use clap::{Parser, Subcommand};
use medicine_search::config::Config;
use medicine_search::ingestion::loader::import_folder;
use medicine_search::ingestion::types::NullIdPolicy;
use medicine_search::pool::pool::ConnectionPool;
use medicine_search::search::engine::SearchDispatcher;
use medicine_search::server::{serve, shutdown_signal};
use medicine_search::store::database::Store;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "medicine-search")]
#[command(author, version, about = "Medicine catalog search service", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "MEDSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides `database.path`)
    #[arg(long, global = true, env = "MEDSEARCH_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the search API over HTTP
    Serve {
        /// Listen address (overrides `server.bind`)
        #[arg(long, env = "MEDSEARCH_BIND")]
        bind: Option<SocketAddr>,
    },
    /// Load every JSON file of a folder into the store
    Import {
        /// Folder holding the source files (overrides `import.data_dir`)
        #[arg(long, env = "MEDSEARCH_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Handling of records without an id (overrides `import.null_ids`)
        #[arg(long, value_enum)]
        null_ids: Option<NullIdPolicy>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    let store = Store::new(config.database.path.clone());

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.server.bind);
            run_server(store, config, bind).await
        }
        Command::Import { data_dir, null_ids } => {
            let data_dir = data_dir.unwrap_or(config.import.data_dir);
            let null_ids = null_ids.unwrap_or(config.import.null_ids);
            run_import(store, data_dir, null_ids).await
        }
    }
}

async fn run_server(store: Store, config: Config, bind: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Opening store {}", store.path().display());
    store
        .initialize()
        .with_context(|| format!("failed to initialize {}", store.path().display()))?;

    let pool = ConnectionPool::new(store.connect_fn(), config.pool)?;
    let dispatcher = Arc::new(SearchDispatcher::new(pool, config.search));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!("Press Ctrl+C to shutdown");

    serve(listener, dispatcher, shutdown_signal()).await?;
    Ok(())
}

async fn run_import(store: Store, data_dir: PathBuf, null_ids: NullIdPolicy) -> anyhow::Result<()> {
    // The loader is synchronous and owns its own writer connection.
    let report = tokio::task::spawn_blocking(move || import_folder(&store, &data_dir, null_ids))
        .await
        .context("import worker failed")??;

    tracing::info!(
        "Skipped {} duplicate record(s) across {} file(s)",
        report.skipped_duplicates,
        report.files.len()
    );
    println!("Import finished. Total records imported: {}", report.imported);
    Ok(())
}
