//! Dashboard view: catalog search plus the library vs. catalog comparison.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use super::{banner_message, redirect_with};
use crate::api::catalog::search;
use crate::api::library::ingest as api_ingest;
use crate::api::shows::{
    add_show as api_add_show, delete_show as api_delete_show, list_shows, AddShowRequest,
    DeleteShowQuery,
};
use crate::error::AppError;
use crate::services::reconcile::ShowOverview;
use crate::services::TmdbClient;
use crate::AppState;

const POSTER_SIZE: &str = "w200";

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub query: String,
    pub show_all: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub results: Vec<SearchResultView>,
    pub rows: Vec<ShowRowView>,
    pub tracked_count: usize,
}

// =============================================================================
// View Models
// =============================================================================

pub struct SearchResultView {
    pub catalog_id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub poster_url: Option<String>,
    /// Internal id when the show is already tracked.
    pub tracked_id: Option<i64>,
}

pub struct ShowRowView {
    pub id: i64,
    pub title: String,
    pub row_class: &'static str,
    pub library_label: Option<String>,
    pub catalog_label: Option<String>,
    pub air_date_label: Option<String>,
    /// Shows absent from the library can be removed straight from the table.
    pub removable: bool,
}

impl From<&ShowOverview> for ShowRowView {
    fn from(show: &ShowOverview) -> Self {
        let row_class = if show.released {
            "released"
        } else if show.has_new_season {
            "new-season"
        } else {
            ""
        };

        let catalog_label = show.latest_catalog_season.map(|season| {
            match show.latest_catalog_episodes {
                Some(episodes) => format!("Season {} ({} episodes)", season, episodes),
                None => format!("Season {}", season),
            }
        });

        Self {
            id: show.show.id,
            title: show.show.title.clone(),
            row_class,
            library_label: show
                .latest_library_season
                .map(|season| format!("Season {}", season)),
            catalog_label,
            air_date_label: show.latest_catalog_air_date.as_deref().map(format_air_date),
            removable: show.latest_library_season.is_none(),
        }
    }
}

/// `2024-05-01` -> `1 May 2024`. Unparseable dates are shown as-is.
fn format_air_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%-d %B %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

// =============================================================================
// Query / Form Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub q: Option<String>,
    pub all: Option<bool>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Form data for tracking a search result.
///
/// Fields are plain text so a malformed post still reaches the handler and
/// comes back as an error banner.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddShowForm {
    pub catalog_id: String,
    pub title: String,
    pub poster_path: Option<String>,
    pub q: Option<String>,
}

/// Form data for removing a tracked show
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoveShowForm {
    pub id: String,
    pub title: String,
    pub q: Option<String>,
}

// =============================================================================
// View Handlers
// =============================================================================

/// Render the dashboard page
pub async fn page(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> Response {
    let show_all = query.all.unwrap_or(false);
    let search_text = query.q.as_deref().map(str::trim).unwrap_or("").to_string();
    let mut error = query.error.clone();

    let shows = match list_shows(State(state.clone())).await {
        Ok(Json(shows)) => shows,
        Err(e) => {
            error = Some(banner_message(&e));
            Vec::new()
        }
    };

    let tracked: HashMap<i64, i64> = shows
        .iter()
        .map(|s| (s.show.catalog_id, s.show.id))
        .collect();

    let results = if search_text.is_empty() {
        Vec::new()
    } else {
        match search(&state, &search_text).await {
            Ok(page) => page
                .results
                .into_iter()
                .map(|r| SearchResultView {
                    catalog_id: r.id,
                    tracked_id: tracked.get(&r.id).copied(),
                    poster_url: r
                        .poster_path
                        .as_deref()
                        .map(|p| TmdbClient::poster_url(p, POSTER_SIZE)),
                    poster_path: r.poster_path.unwrap_or_default(),
                    overview: r.overview.unwrap_or_default(),
                    title: r.name,
                })
                .collect(),
            Err(e) => {
                error = Some(banner_message(&e));
                Vec::new()
            }
        }
    };

    let rows = shows
        .iter()
        .filter(|s| show_all || s.has_new_season)
        .map(ShowRowView::from)
        .collect();

    DashboardTemplate {
        query: search_text,
        show_all,
        notice: query.notice,
        error,
        results,
        rows,
        tracked_count: shows.len(),
    }
    .into_response()
}

/// Track a show from the search results
pub async fn add_show(State(state): State<AppState>, Form(form): Form<AddShowForm>) -> Redirect {
    let q = form.q.clone().unwrap_or_default();
    let Ok(catalog_id) = form.catalog_id.trim().parse::<i64>() else {
        let err = AppError::Validation(format!("Invalid catalog id: {}", form.catalog_id));
        return redirect_with("/", &[("q", &q), ("error", &banner_message(&err))]);
    };
    let request = AddShowRequest {
        catalog_id,
        title: form.title.clone(),
        poster: form.poster_path.filter(|p| !p.is_empty()),
    };

    match api_add_show(State(state), Ok(Json(request))).await {
        Ok(_) => redirect_with(
            "/",
            &[
                ("q", &q),
                ("notice", &format!("Added {} to tracked shows", form.title)),
            ],
        ),
        Err(e) => redirect_with("/", &[("q", &q), ("error", &banner_message(&e))]),
    }
}

/// Stop tracking a show
pub async fn remove_show(
    State(state): State<AppState>,
    Form(form): Form<RemoveShowForm>,
) -> Redirect {
    let q = form.q.clone().unwrap_or_default();
    let query = DeleteShowQuery {
        id: Some(form.id.clone()),
    };

    match api_delete_show(State(state), Query(query)).await {
        Ok(_) => redirect_with(
            "/",
            &[
                ("q", &q),
                (
                    "notice",
                    &format!("Removed {} from tracked shows", form.title),
                ),
            ],
        ),
        Err(e) => redirect_with("/", &[("q", &q), ("error", &banner_message(&e))]),
    }
}

/// Refresh seasons from Jellyfin
pub async fn ingest(State(state): State<AppState>) -> Redirect {
    match api_ingest(State(state)).await {
        Ok(Json(result)) => {
            let summary = result.summary;
            redirect_with(
                "/",
                &[(
                    "notice",
                    &format!(
                        "Updated {} shows and {} seasons",
                        summary.shows_processed, summary.seasons_processed
                    ),
                )],
            )
        }
        Err(e) => redirect_with("/", &[("error", &banner_message(&e))]),
    }
}
