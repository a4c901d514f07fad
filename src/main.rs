//! # Legal Search Server Main Driver
//!
//! ## Purpose
//! Main entry point for the legal semantic search server. Loads configuration,
//! builds the initial index snapshot, and serves the search API.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Build the embedding capability and the index store
//! 4. Build the initial snapshot (degraded "not ready" mode on failure)
//! 5. Start the API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use legal_semantic_search::{
    api::ApiServer, config::Config, embedding, errors::Result, query::QueryEngine,
    store::LegalIndexStore, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("legal-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Vector-based semantic search over Indian legal documents")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dataset")
                .short('d')
                .long("dataset")
                .value_name("DIR")
                .help("Dataset directory holding the corpus JSON files"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(dataset) = matches.get_one::<String>("dataset") {
        config.corpus.dataset_dir = dataset.into();
    }

    let config = Arc::new(config);

    init_logging(&config);

    info!("Starting Legal Semantic Search v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    let app_state = initialize_components(config.clone()).await?;

    let server = ApiServer::new(app_state.clone());
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Legal search server listening on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Legal search server shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build the store and the initial snapshot.
///
/// An empty corpus is a valid terminal state. A failed embedding run leaves
/// the store unready; the API still starts and reports the degraded state
/// through `/health` and 503 responses until a `/reload` succeeds.
async fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Initializing vector store...");

    let embedder = embedding::embedder_from_config(&config.embedding)?;
    let store = Arc::new(LegalIndexStore::new(embedder));

    match store.build(&config.corpus.dataset_dir).await {
        Ok(snapshot) => {
            info!(
                "Vector store initialized with {} records (model: {})",
                snapshot.records().len(),
                store.model_name()
            );
        }
        Err(e) => {
            error!(
                "Failed to initialize vector store: {}, running in degraded mode",
                e
            );
        }
    }

    let query_engine = Arc::new(QueryEngine::new(store.clone()));

    Ok(AppState {
        config,
        store,
        query_engine,
    })
}
