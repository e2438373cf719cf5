use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seasonwatch::config::Config;
use seasonwatch::services::{CatalogProvider, JellyfinClient, LibraryProvider, TmdbClient};
use seasonwatch::{db, AppState};

fn init_tracing() {
    // RUST_LOG controls log levels
    // Default: debug for our crate, info for axum, warn for dependencies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("seasonwatch=debug,tower_http=debug,axum=info,warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // Initialize tracing first so we can log configuration loading
    init_tracing();

    tracing::info!("Starting seasonwatch v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            tracing::debug!("Server: {}:{}", cfg.server.host, cfg.server.port);
            tracing::debug!("Database: {:?}", cfg.database.path);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let conn = match db::init_db(&config.database.path) {
        Ok(conn) => {
            tracing::info!("Database initialized at {:?}", config.database.path);
            conn
        }
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let catalog: Option<Arc<dyn CatalogProvider>> = match TmdbClient::new_shared(&config.tmdb) {
        Ok(client) => {
            tracing::info!("TMDB client initialized");
            Some(client)
        }
        Err(e) => {
            tracing::warn!("TMDB client unavailable: {}", e);
            None
        }
    };

    let library: Option<Arc<dyn LibraryProvider>> =
        match JellyfinClient::new_shared(&config.jellyfin) {
            Ok(client) => {
                tracing::info!("Jellyfin client initialized");
                Some(client)
            }
            Err(e) => {
                tracing::warn!("Jellyfin client unavailable: {}", e);
                None
            }
        };

    let addr = config.server_addr();

    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(Mutex::new(conn)),
        catalog,
        library,
        start_time: Instant::now(),
    };

    let app = seasonwatch::app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("seasonwatch listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
