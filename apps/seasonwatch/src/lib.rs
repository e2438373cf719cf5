//! seasonwatch library
//!
//! Tracks TV shows, compares the seasons present in a Jellyfin library with
//! the latest seasons published on TMDB, and serves the comparison over a
//! JSON API and a small server-rendered UI.
//! This library exposes modules for use in integration tests.

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod static_files;
pub mod views;

use config::Config;
use error::{AppError, Result};
use services::{CatalogProvider, LibraryProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Mutex<Connection>>,
    pub catalog: Option<Arc<dyn CatalogProvider>>,
    pub library: Option<Arc<dyn LibraryProvider>>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Get the catalog client, or an upstream error when it is not configured.
    pub fn catalog(&self) -> Result<&dyn CatalogProvider> {
        self.catalog
            .as_deref()
            .ok_or_else(|| AppError::upstream("tmdb", "TMDB client not configured"))
    }

    /// Get the library client, or an upstream error when it is not configured.
    pub fn library(&self) -> Result<&dyn LibraryProvider> {
        self.library
            .as_deref()
            .ok_or_else(|| AppError::upstream("jellyfin", "Jellyfin client not configured"))
    }

    /// Get the start time of the application.
    pub fn start_time(&self) -> std::time::Instant {
        self.start_time
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
    pub uptime_secs: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "seasonwatch is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time().elapsed().as_secs(),
    })
}

/// CORS policy for the configured origins. No origins means same-origin only.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() {
        return cors;
    }

    let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    tracing::info!("CORS: Allowing origins {:?}", origins);
    cors.allow_origin(AllowOrigin::list(parsed))
}

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::router())
        .merge(views::router())
        .route("/static/*path", get(static_files::serve_static))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(cors_origins: Vec<String>) -> AppState {
        let mut config = Config::load_from("nonexistent.toml").unwrap();
        config.server.cors_origins = cors_origins;

        AppState {
            config: Arc::new(config),
            db: Arc::new(Mutex::new(db::init_db_memory().unwrap())),
            catalog: None,
            library: None,
            start_time: std::time::Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app(test_state(Vec::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let router = app(test_state(vec!["http://localhost:5173".to_string()]));

        let response = router
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_cors_same_origin_by_default() {
        let response = app(test_state(Vec::new()))
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_missing_clients_are_upstream_errors() {
        let state = test_state(Vec::new());
        assert!(matches!(state.catalog(), Err(AppError::Upstream { .. })));
        assert!(matches!(state.library(), Err(AppError::Upstream { .. })));
    }
}
