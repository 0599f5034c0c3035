mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binder_core::{
    load_config, validate_config, CardSource, CardStore, ScryfallClient, SqliteCardStore,
    SqliteSyncRunStore, SyncRunStore, SyncRunner,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("BINDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Upstream catalog: {}", config.upstream.base_url);

    // Config hash for correlating logs with deployed configuration
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(version = VERSION, config_hash = &config_hash[..16], "Starting binder");

    // Create SQLite card store (search strategy fixed at startup)
    let store: Arc<dyn CardStore> = Arc::new(
        SqliteCardStore::new(&config.database.path, &config.search)
            .context("Failed to create card store")?,
    );
    info!("Card store initialized");

    // Create SQLite sync-run ledger
    let ledger: Arc<dyn SyncRunStore> = Arc::new(
        SqliteSyncRunStore::new(&config.database.path).context("Failed to create sync ledger")?,
    );
    info!("Sync ledger initialized");

    // Create the upstream catalog client
    let source: Arc<dyn CardSource> = Arc::new(
        ScryfallClient::new(config.upstream.clone())
            .context("Failed to create upstream catalog client")?,
    );
    info!("Upstream catalog client initialized");

    // Create the sync runner
    let runner = Arc::new(SyncRunner::new(
        config.sync.clone(),
        source,
        Arc::clone(&store),
        Arc::clone(&ledger),
    ));
    info!("Sync runner initialized");

    // Metrics registry
    let registry = metrics::build_registry().context("Failed to build metrics registry")?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), store, ledger, runner, registry));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
