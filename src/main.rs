//! Recipe API - A recipe CRUD backend with image normalization
//!
//! Stores recipes in MongoDB, normalizes uploaded images to bounded JPEGs
//! and serves single-recipe reads through a read-through cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_api::config::StoreBackend;
use recipe_api::store::{MemoryRecipeStore, MongoRecipeStore, RecipeStore};
use recipe_api::{create_router, AppState, Config};

/// Main entry point for the Recipe API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the configured store (bounded by the connect timeout)
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recipe API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: store={:?}, port={}, upload_dir={}, store_timeout={}s",
        config.store_backend,
        config.server_port,
        config.upload_dir.display(),
        config.store_timeout_secs
    );

    let store = connect_store(&config).await?;
    let state = AppState::from_config(&config, store);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured store. Startup fails if MongoDB cannot be reached
/// within the connect timeout.
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn RecipeStore>> {
    match config.store_backend {
        StoreBackend::Mongo => {
            let connect = MongoRecipeStore::connect(config);
            let store = tokio::time::timeout(config.connect_timeout(), connect)
                .await
                .with_context(|| {
                    format!(
                        "timed out connecting to MongoDB after {}s",
                        config.connect_timeout_secs
                    )
                })?
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory recipe store; data is lost on shutdown");
            Ok(Arc::new(MemoryRecipeStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
