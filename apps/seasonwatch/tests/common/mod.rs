//! Test infrastructure for seasonwatch integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` backed by an
//! in-memory database, plus in-process fakes for TMDB and Jellyfin.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use seasonwatch::error::{AppError, Result};
use seasonwatch::services::jellyfin::{LibrarySeason, LibrarySeries};
use seasonwatch::services::tmdb::{
    TmdbSearchResponse, TmdbSeasonSummary, TmdbTvDetails, TmdbTvShow,
};
use seasonwatch::services::{CatalogProvider, LibraryProvider};
use seasonwatch::{config::Config, db, AppState};

// =============================================================================
// Fakes
// =============================================================================

/// In-memory TMDB stand-in.
#[derive(Default)]
pub struct FakeCatalog {
    shows: HashMap<i64, TmdbTvDetails>,
    failing: HashSet<i64>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a show. Seasons are `(number, episode_count, air_date)` in
    /// published order.
    pub fn with_show(mut self, id: i64, name: &str, seasons: &[(i64, i64, &str)]) -> Self {
        let seasons = seasons
            .iter()
            .map(|(number, episodes, air_date)| TmdbSeasonSummary {
                season_number: *number,
                episode_count: Some(*episodes),
                air_date: Some(air_date.to_string()),
                name: Some(format!("Season {}", number)),
                poster_path: None,
            })
            .collect::<Vec<_>>();

        self.shows.insert(
            id,
            TmdbTvDetails {
                id,
                name: name.to_string(),
                overview: Some(format!("About {}", name)),
                first_air_date: None,
                last_air_date: None,
                poster_path: Some(format!("/{}.jpg", id)),
                status: None,
                number_of_seasons: Some(seasons.len() as i64),
                seasons,
            },
        );
        self
    }

    /// Make detail lookups for `id` fail with an upstream error.
    pub fn failing(mut self, id: i64) -> Self {
        self.failing.insert(id);
        self
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn search_tv(&self, query: &str) -> Result<TmdbSearchResponse<TmdbTvShow>> {
        let needle = query.to_lowercase();
        let mut results: Vec<TmdbTvShow> = self
            .shows
            .values()
            .filter(|show| show.name.to_lowercase().contains(&needle))
            .map(|show| TmdbTvShow {
                id: show.id,
                name: show.name.clone(),
                overview: show.overview.clone(),
                first_air_date: show.first_air_date.clone(),
                poster_path: show.poster_path.clone(),
            })
            .collect();
        results.sort_by_key(|show| show.id);

        let total = results.len() as i32;
        Ok(TmdbSearchResponse {
            results,
            page: 1,
            total_pages: 1,
            total_results: total,
        })
    }

    async fn get_tv(&self, id: i64) -> Result<TmdbTvDetails> {
        if self.failing.contains(&id) {
            return Err(AppError::upstream_status("tmdb /tv", 500));
        }
        self.shows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::upstream_status("tmdb /tv", 404))
    }
}

/// In-memory Jellyfin stand-in.
#[derive(Default)]
pub struct FakeLibrary {
    series: Vec<LibrarySeries>,
    seasons: HashMap<String, Vec<LibrarySeason>>,
    failing: HashSet<String>,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series. Seasons are `(index, episode_count)`.
    pub fn with_series(
        mut self,
        id: &str,
        name: &str,
        catalog_id: Option<&str>,
        seasons: &[(i64, i64)],
    ) -> Self {
        self.series.push(LibrarySeries {
            id: id.to_string(),
            name: name.to_string(),
            catalog_id: catalog_id.map(str::to_string),
        });
        self.seasons.insert(
            id.to_string(),
            seasons
                .iter()
                .map(|(index, episodes)| LibrarySeason {
                    index: Some(*index),
                    episode_count: Some(*episodes),
                })
                .collect(),
        );
        self
    }

    /// Make the seasons call for `id` fail.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }
}

#[async_trait]
impl LibraryProvider for FakeLibrary {
    async fn list_series(&self) -> Result<Vec<LibrarySeries>> {
        Ok(self.series.clone())
    }

    async fn list_seasons(&self, series_id: &str) -> Result<Vec<LibrarySeason>> {
        if self.failing.contains(series_id) {
            return Err(AppError::upstream_status("jellyfin /Shows/Seasons", 500));
        }
        Ok(self.seasons.get(series_id).cloned().unwrap_or_default())
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    db: Arc<Mutex<Connection>>,
}

impl TestApp {
    /// Create a test application with no TMDB or Jellyfin client configured.
    pub async fn new() -> Self {
        Self::build(None, None)
    }

    /// Create a test application with the given fakes injected.
    pub async fn with_providers(catalog: FakeCatalog, library: FakeLibrary) -> Self {
        Self::build(Some(Arc::new(catalog)), Some(Arc::new(library)))
    }

    fn build(
        catalog: Option<Arc<dyn CatalogProvider>>,
        library: Option<Arc<dyn LibraryProvider>>,
    ) -> Self {
        let conn = db::init_db_memory().expect("Failed to initialize test database");
        let db = Arc::new(Mutex::new(conn));

        let config = Config {
            server: seasonwatch::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: Vec::new(),
            },
            database: seasonwatch::config::DatabaseConfig {
                path: ":memory:".into(),
            },
            tmdb: Default::default(),
            jellyfin: Default::default(),
        };

        let state = AppState {
            config: Arc::new(config),
            db: Arc::clone(&db),
            catalog,
            library,
            start_time: std::time::Instant::now(),
        };

        // Same router as main.rs
        let server = TestServer::new(seasonwatch::app(state)).expect("Failed to create test server");

        Self { server, db }
    }

    /// Get a reference to the test server.
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Get a reference to the database connection.
    pub fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    /// Insert a tracked show directly and return its id.
    pub async fn seed_show(&self, catalog_id: i64, title: &str) -> i64 {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO shows (catalog_id, title) VALUES (?1, ?2)",
            rusqlite::params![catalog_id, title],
        )
        .expect("Failed to seed show");
        db.last_insert_rowid()
    }

    /// Insert a season for a tracked show directly.
    pub async fn seed_season(&self, show_id: i64, season_number: i64, episode_count: i64) {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO seasons (show_id, season_number, episode_count) VALUES (?1, ?2, ?3)",
            rusqlite::params![show_id, season_number, episode_count],
        )
        .expect("Failed to seed season");
    }

    /// Count rows in a table.
    pub async fn count(&self, table: &str) -> i64 {
        let db = self.db.lock().await;
        db.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .expect("Failed to count rows")
    }
}
