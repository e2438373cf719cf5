//! Admin page: database reset.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use super::{banner_message, redirect_with};
use crate::api::admin::reset as api_reset;
use crate::AppState;

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub notice: Option<String>,
    pub error: Option<String>,
    pub database_path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Render the admin page
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> impl IntoResponse {
    AdminTemplate {
        notice: query.notice,
        error: query.error,
        database_path: state.config.database.path.display().to_string(),
    }
}

/// Handle the reset form submission
pub async fn reset(State(state): State<AppState>) -> Redirect {
    match api_reset(State(state)).await {
        Ok(_) => redirect_with("/admin", &[("notice", "Database reset")]),
        Err(e) => redirect_with("/admin", &[("error", &banner_message(&e))]),
    }
}
