//! TMDB catalog API endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::tmdb::{TmdbSearchResponse, TmdbTvDetails, TmdbTvShow};
use crate::AppState;

/// Query parameters for catalog lookups.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// `search` (default) or `details`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Search text, or the TMDB id for `details`.
    pub query: Option<String>,
}

/// Either a page of search results or one show's full record.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CatalogResponse {
    Search(TmdbSearchResponse<TmdbTvShow>),
    Details(TmdbTvDetails),
}

/// GET /api/catalog?type=search|details&query=<text>
pub async fn catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Query parameter is required".to_string()))?;

    let response = match params.kind.as_deref().unwrap_or("search") {
        "search" => CatalogResponse::Search(search(&state, query).await?),
        "details" => {
            let id = query
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| AppError::Validation(format!("Invalid catalog id: {}", query)))?;
            CatalogResponse::Details(details(&state, id).await?)
        }
        other => {
            return Err(AppError::Validation(format!(
                "Invalid request type: {}",
                other
            )))
        }
    };

    Ok(Json(response))
}

/// Search TMDB for TV shows.
pub async fn search(state: &AppState, query: &str) -> Result<TmdbSearchResponse<TmdbTvShow>> {
    tracing::info!(query = %query, "Searching TMDB");
    state.catalog()?.search_tv(query).await
}

/// Fetch one show's full TMDB record.
pub async fn details(state: &AppState, id: i64) -> Result<TmdbTvDetails> {
    tracing::info!(catalog_id = id, "Fetching TMDB details");
    state.catalog()?.get_tv(id).await
}
