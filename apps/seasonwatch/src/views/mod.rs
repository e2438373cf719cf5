//! Server-rendered pages.
//!
//! Views are thin wrappers around the API handlers: they call the handler,
//! turn the result into a view model and render an askama template. Form
//! posts redirect back to the page with a `notice` or `error` banner.

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::error::AppError;
use crate::AppState;

pub mod admin;
pub mod dashboard;

/// Page and form routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::page))
        .route("/ui/shows/add", post(dashboard::add_show))
        .route("/ui/shows/remove", post(dashboard::remove_show))
        .route("/ui/ingest", post(dashboard::ingest))
        .route("/admin", get(admin::page))
        .route("/ui/admin/reset", post(admin::reset))
}

/// Redirect to `path` with URL-encoded query parameters. Empty values are
/// dropped.
pub(crate) fn redirect_with(path: &str, params: &[(&str, &str)]) -> Redirect {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if query.is_empty() {
        Redirect::to(path)
    } else {
        Redirect::to(&format!("{}?{}", path, query.join("&")))
    }
}

/// Text safe to show in an error banner.
pub(crate) fn banner_message(err: &AppError) -> String {
    match err {
        AppError::Validation(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
            msg.clone()
        }
        AppError::Upstream { .. } => err.to_string(),
        other => {
            tracing::error!(error = %other, "Request failed");
            "Something went wrong, check the server logs".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response.headers()["location"].to_str().unwrap().to_string()
    }

    #[test]
    fn test_redirect_encodes_params() {
        let url = location(redirect_with("/", &[("notice", "Added Show & Co"), ("q", "")]));
        assert_eq!(url, "/?notice=Added%20Show%20%26%20Co");
    }

    #[test]
    fn test_redirect_without_params() {
        assert_eq!(location(redirect_with("/admin", &[])), "/admin");
    }

    #[test]
    fn test_banner_hides_internal_details() {
        let msg = banner_message(&AppError::Internal("secret path".to_string()));
        assert!(!msg.contains("secret"));

        let msg = banner_message(&AppError::Conflict("already tracked".to_string()));
        assert_eq!(msg, "already tracked");
    }
}
