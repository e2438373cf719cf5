//! Administrative endpoints.

use axum::{extract::State, Json};

use super::SuccessResponse;
use crate::db;
use crate::error::Result;
use crate::AppState;

/// POST /api/admin/reset
///
/// Drops and recreates every table. Destructive.
pub async fn reset(State(state): State<AppState>) -> Result<Json<SuccessResponse>> {
    let mut conn = state.db.lock().await;
    db::reset_db(&mut conn)?;

    tracing::warn!("All tracked shows and seasons were deleted by a database reset");

    Ok(Json(SuccessResponse::ok()))
}
