//! JSON API endpoint handlers for seasonwatch.

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::AppState;

pub mod admin;
pub mod catalog;
pub mod library;
pub mod shows;

/// Success response for operations without specific data.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/shows",
            get(shows::list_shows)
                .post(shows::add_show)
                .delete(shows::delete_show),
        )
        .route("/library", get(library::list_library))
        .route("/library/ingest", post(library::ingest))
        .route("/catalog", get(catalog::catalog))
        .route("/admin/reset", post(admin::reset))
}
