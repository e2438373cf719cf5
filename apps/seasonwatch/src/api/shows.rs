//! Tracked shows API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::SuccessResponse;
use crate::db::ShowRepository;
use crate::error::{AppError, Result};
use crate::services::reconcile::{annotate_with_latest_catalog_season, ShowOverview};
use crate::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request body for tracking a show.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShowRequest {
    /// TMDB TV show ID.
    #[serde(alias = "tmdbId", alias = "catalog_id")]
    pub catalog_id: i64,
    pub title: String,
    /// TMDB poster path, e.g. `/abc.jpg`.
    #[serde(default, alias = "posterPath", alias = "poster_path")]
    pub poster: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddShowResponse {
    pub id: i64,
}

/// Query parameters for deleting a show.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteShowQuery {
    /// Internal show id. Kept as text so a missing or malformed value is a
    /// validation error rather than an extractor rejection.
    pub id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/shows
///
/// Lists tracked shows with the latest library season and the latest TMDB
/// season side by side.
pub async fn list_shows(State(state): State<AppState>) -> Result<Json<Vec<ShowOverview>>> {
    let shows = {
        let db = state.db.lock().await;
        ShowRepository::new(&db).list_with_latest_season()?
    };

    let overviews =
        annotate_with_latest_catalog_season(shows, state.catalog.as_deref(), Utc::now()).await;

    Ok(Json(overviews))
}

/// POST /api/shows
///
/// Starts tracking a show found on TMDB.
pub async fn add_show(
    State(state): State<AppState>,
    body: std::result::Result<Json<AddShowRequest>, JsonRejection>,
) -> Result<Json<AddShowResponse>> {
    let Json(body) = body?;

    if body.catalog_id <= 0 {
        return Err(AppError::Validation("Invalid catalog id".to_string()));
    }

    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let poster = body.poster.as_deref().filter(|p| !p.trim().is_empty());

    let db = state.db.lock().await;
    let id = ShowRepository::new(&db).insert(body.catalog_id, title, poster)?;

    tracing::info!(show_id = id, catalog_id = body.catalog_id, title = %title, "Show added");

    Ok(Json(AddShowResponse { id }))
}

/// DELETE /api/shows?id=<id>
///
/// Stops tracking a show and removes its seasons.
pub async fn delete_show(
    State(state): State<AppState>,
    Query(query): Query<DeleteShowQuery>,
) -> Result<Json<SuccessResponse>> {
    let raw = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Show ID is required".to_string()))?;

    let show_id: i64 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid show ID: {}", raw)))?;

    let db = state.db.lock().await;
    ShowRepository::new(&db).delete(show_id)?;

    tracing::info!(show_id, "Show deleted");

    Ok(Json(SuccessResponse::ok()))
}
