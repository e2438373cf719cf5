//! TMDB (The Movie Database) service client.
//!
//! Provides methods to search and fetch TV show metadata from the TMDB API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TmdbConfig;
use crate::error::{AppError, Result};

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Read-only access to the external show catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Free-text TV show search.
    async fn search_tv(&self, query: &str) -> Result<TmdbSearchResponse<TmdbTvShow>>;

    /// Full show record including its season list.
    async fn get_tv(&self, id: i64) -> Result<TmdbTvDetails>;
}

/// TMDB API client for fetching TV show metadata.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client from configuration.
    ///
    /// Returns an error if the API key is missing or empty, or if the HTTP
    /// client cannot be built.
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::upstream("tmdb", "API key is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new TMDB client wrapped in Arc for shared access.
    pub fn new_shared(config: &TmdbConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// Generate a poster URL for the given path and size.
    ///
    /// Common sizes: "w92", "w154", "w185", "w342", "w500", "w780", "original"
    pub fn poster_url(path: &str, size: &str) -> String {
        format!("{}/{}{}", TMDB_IMAGE_BASE, size, path)
    }

    /// Internal helper to perform GET requests with query parameters and deserialize JSON responses.
    async fn get_with_params<T, P>(&self, path: &str, params: &[P]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        P: Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        let target = format!("tmdb {}", path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::upstream(&target, format!("request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                tracing::warn!("TMDB API key is invalid or missing");
            }
            return Err(AppError::upstream_status(target, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::upstream(target, format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl CatalogProvider for TmdbClient {
    async fn search_tv(&self, query: &str) -> Result<TmdbSearchResponse<TmdbTvShow>> {
        tracing::debug!(query = %query, "Searching TMDB TV shows");

        self.get_with_params("/search/tv", &[("query", query)]).await
    }

    async fn get_tv(&self, id: i64) -> Result<TmdbTvDetails> {
        tracing::debug!(tv_id = %id, "Fetching TMDB TV show details");

        let no_params: [(&str, &str); 0] = [];
        self.get_with_params(&format!("/tv/{}", id), &no_params)
            .await
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Generic search response wrapper from TMDB API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSearchResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub total_pages: i32,
    #[serde(default)]
    pub total_results: i32,
}

/// TV show search result from TMDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbTvShow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Detailed TV show information from TMDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbTvDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub last_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub number_of_seasons: Option<i64>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeasonSummary>,
}

impl TmdbTvDetails {
    /// The last season in TMDB's published order.
    ///
    /// `None` when that season is Specials (number 0) or otherwise not a
    /// positive season number.
    pub fn latest_season(&self) -> Option<&TmdbSeasonSummary> {
        self.seasons.last().filter(|s| s.season_number > 0)
    }
}

/// Season summary included in TV show details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSeasonSummary {
    pub season_number: i64,
    #[serde(default)]
    pub episode_count: Option<i64>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}
