//! Jellyfin library API endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::models::LibraryShow;
use crate::db::ShowRepository;
use crate::error::Result;
use crate::services::reconcile::{ingest_from_library, IngestSummary};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: IngestSummary,
}

/// POST /api/library/ingest
///
/// Pulls every series from Jellyfin and upserts tracked shows and seasons.
pub async fn ingest(State(state): State<AppState>) -> Result<Json<IngestResponse>> {
    let library = state.library()?;
    let summary = ingest_from_library(&state.db, library).await?;

    Ok(Json(IngestResponse {
        success: true,
        summary,
    }))
}

/// GET /api/library
///
/// Lists every series recorded by the last ingest, resolved or not.
pub async fn list_library(State(state): State<AppState>) -> Result<Json<Vec<LibraryShow>>> {
    let db = state.db.lock().await;
    let rows = ShowRepository::new(&db).list_library_shows()?;
    Ok(Json(rows))
}
