//! Reconciliation between the Jellyfin library and the TMDB catalog.
//!
//! Ingest walks the library and upserts shows and seasons into the
//! repository. Annotation joins each tracked show with TMDB's latest season
//! so the UI can tell which shows have a new season not present locally.
//!
//! Both operations isolate failures per item: one bad series or one failed
//! TMDB lookup is logged and skipped, never fatal for the batch.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use rusqlite::Connection;
use serde::Serialize;
use tokio::sync::Mutex;

use super::jellyfin::{LibraryProvider, LibrarySeason, LibrarySeries};
use super::tmdb::CatalogProvider;
use crate::db::models::{Show, ShowWithLatestSeason};
use crate::db::ShowRepository;
use crate::error::Result;

/// Aggregate counts reported by [`ingest_from_library`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub shows_processed: usize,
    pub seasons_processed: usize,
    pub series_skipped: usize,
}

/// A tracked show annotated with both the local and the catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowOverview {
    #[serde(flatten)]
    pub show: Show,
    pub latest_library_season: Option<i64>,
    pub latest_library_episodes: Option<i64>,
    pub latest_catalog_season: Option<i64>,
    pub latest_catalog_episodes: Option<i64>,
    pub latest_catalog_air_date: Option<String>,
    pub has_new_season: bool,
    pub released: bool,
}

/// Latest-season fields taken from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CatalogLatest {
    season: Option<i64>,
    episodes: Option<i64>,
    air_date: Option<String>,
}

// =============================================================================
// Ingest
// =============================================================================

/// Pull every series from the library and upsert shows and seasons.
///
/// Only the initial series listing can fail the whole call. Series without a
/// usable TMDB id, series whose seasons cannot be listed, and series whose
/// writes fail are skipped and counted in `series_skipped`. Each series is
/// written in its own transaction and the lock is never held across a
/// library call.
pub async fn ingest_from_library(
    db: &Mutex<Connection>,
    library: &dyn LibraryProvider,
) -> Result<IngestSummary> {
    let all_series = library.list_series().await?;
    tracing::info!(series = all_series.len(), "Starting library ingest");

    let mut summary = IngestSummary::default();

    for series in &all_series {
        let Some(catalog_id) = parse_catalog_id(series.catalog_id.as_deref()) else {
            tracing::debug!(
                library_id = %series.id,
                title = %series.name,
                raw_catalog_id = ?series.catalog_id,
                "Series has no usable TMDB id, skipping"
            );
            let conn = db.lock().await;
            if let Err(e) =
                ShowRepository::new(&conn).upsert_library_show(&series.id, None, &series.name)
            {
                tracing::warn!(library_id = %series.id, error = %e, "Failed to record library series");
            }
            summary.series_skipped += 1;
            continue;
        };

        let seasons = match library.list_seasons(&series.id).await {
            Ok(seasons) => seasons,
            Err(e) => {
                tracing::warn!(
                    library_id = %series.id,
                    catalog_id,
                    error = %e,
                    "Failed to list seasons, skipping series"
                );
                summary.series_skipped += 1;
                continue;
            }
        };

        let conn = db.lock().await;
        match write_series(&conn, series, catalog_id, &seasons) {
            Ok(written) => {
                summary.shows_processed += 1;
                summary.seasons_processed += written;
            }
            Err(e) => {
                tracing::warn!(
                    library_id = %series.id,
                    catalog_id,
                    error = %e,
                    "Failed to store series, skipping"
                );
                summary.series_skipped += 1;
            }
        }
    }

    tracing::info!(
        shows = summary.shows_processed,
        seasons = summary.seasons_processed,
        skipped = summary.series_skipped,
        "Library ingest finished"
    );

    Ok(summary)
}

/// Upsert one series and its indexed seasons atomically. Returns the number
/// of seasons written.
fn write_series(
    conn: &Connection,
    series: &LibrarySeries,
    catalog_id: i64,
    seasons: &[LibrarySeason],
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let repo = ShowRepository::new(&tx);

    repo.upsert_library_show(&series.id, Some(catalog_id), &series.name)?;
    let show_id = repo.upsert_show(catalog_id, &series.name)?;

    let mut written = 0;
    for season in seasons {
        // Specials (index 0) are not numbered seasons
        let Some(index) = season.index.filter(|i| *i > 0) else {
            continue;
        };
        repo.upsert_season(show_id, index, season.episode_count)?;
        written += 1;
    }

    tx.commit()?;
    Ok(written)
}

/// Parse a library-reported TMDB id. Only positive integers are usable.
pub fn parse_catalog_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

// =============================================================================
// Annotation
// =============================================================================

/// Attach TMDB's latest season to every show.
///
/// Lookups run concurrently. A failed lookup, or a missing catalog client,
/// leaves that show's catalog fields empty.
pub async fn annotate_with_latest_catalog_season(
    shows: Vec<ShowWithLatestSeason>,
    catalog: Option<&dyn CatalogProvider>,
    now: DateTime<Utc>,
) -> Vec<ShowOverview> {
    if catalog.is_none() && !shows.is_empty() {
        tracing::warn!("TMDB client not configured, catalog seasons will be unknown");
    }

    let lookups = shows.iter().map(|entry| async move {
        let Some(catalog) = catalog else {
            return CatalogLatest::default();
        };

        match catalog.get_tv(entry.show.catalog_id).await {
            Ok(details) => details
                .latest_season()
                .map(|s| CatalogLatest {
                    season: Some(s.season_number),
                    episodes: s.episode_count,
                    air_date: s.air_date.clone().filter(|d| !d.is_empty()),
                })
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    catalog_id = entry.show.catalog_id,
                    title = %entry.show.title,
                    error = %e,
                    "Failed to fetch TMDB details"
                );
                CatalogLatest::default()
            }
        }
    });

    let latest = join_all(lookups).await;

    shows
        .into_iter()
        .zip(latest)
        .map(|(entry, latest)| {
            let has_new = has_new_season(entry.latest_library_season, latest.season);
            let released = has_new && is_released(latest.air_date.as_deref(), now);
            ShowOverview {
                show: entry.show,
                latest_library_season: entry.latest_library_season,
                latest_library_episodes: entry.latest_library_episodes,
                latest_catalog_season: latest.season,
                latest_catalog_episodes: latest.episodes,
                latest_catalog_air_date: latest.air_date,
                has_new_season: has_new,
                released,
            }
        })
        .collect()
}

/// True when the catalog knows a season the library does not have.
pub fn has_new_season(library_season: Option<i64>, catalog_season: Option<i64>) -> bool {
    match (library_season, catalog_season) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(library), Some(catalog)) => catalog > library,
    }
}

/// True when a `YYYY-MM-DD` air date (UTC midnight) is strictly before `now`.
pub fn is_released(air_date: Option<&str>, now: DateTime<Utc>) -> bool {
    air_date
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight) < now)
        .unwrap_or(false)
}
