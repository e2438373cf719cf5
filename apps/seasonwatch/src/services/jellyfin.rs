//! Jellyfin media server client.
//!
//! Lists the series in the library and, per series, its seasons with
//! episode counts. Read-only; every call is a single GET.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::JellyfinConfig;
use crate::error::{AppError, Result};

const AUTH_HEADER: &str = "X-Emby-Token";
const TMDB_PROVIDER_KEY: &str = "tmdb";

/// A series as known to the media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySeries {
    /// Library-side id.
    pub id: String,
    pub name: String,
    /// TMDB id as reported by the library. Not validated.
    pub catalog_id: Option<String>,
}

/// A season of a library series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibrarySeason {
    /// Season number, when the library knows it.
    pub index: Option<i64>,
    pub episode_count: Option<i64>,
}

/// Read-only access to the media library inventory.
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// All series in the library.
    async fn list_series(&self) -> Result<Vec<LibrarySeries>>;

    /// Seasons of one series.
    async fn list_seasons(&self, series_id: &str) -> Result<Vec<LibrarySeason>>;
}

/// HTTP client for the Jellyfin REST API.
pub struct JellyfinClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl JellyfinClient {
    /// Create a new Jellyfin client from configuration.
    ///
    /// Returns an error if the URL or API key is missing.
    pub fn new(config: &JellyfinConfig) -> Result<Self> {
        let base_url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::upstream("jellyfin", "server URL is not configured"))?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::upstream("jellyfin", "API key is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a new Jellyfin client wrapped in Arc for shared access.
    pub fn new_shared(config: &JellyfinConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// GET an `{"Items": [...]}` page and decode its items.
    async fn get_items<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let target = format!("jellyfin {}", path);

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::upstream(&target, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_status(target, status.as_u16()));
        }

        let page: ItemsResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(&target, format!("invalid response body: {}", e)))?;

        Ok(parse_items(&target, page.items))
    }
}

/// Decode each item on its own so one malformed record only drops itself.
fn parse_items<T>(target: &str, items: Vec<serde_json::Value>) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(call = %target, error = %e, "Skipping malformed library item");
                None
            }
        })
        .collect()
}

#[async_trait]
impl LibraryProvider for JellyfinClient {
    async fn list_series(&self) -> Result<Vec<LibrarySeries>> {
        tracing::debug!("Listing Jellyfin series");

        let items: Vec<JellyfinSeries> = self
            .get_items(
                "/Items",
                &[
                    ("Recursive", "true"),
                    ("IncludeItemTypes", "Series"),
                    ("Fields", "ProviderIds"),
                ],
            )
            .await?;

        Ok(items.into_iter().map(LibrarySeries::from).collect())
    }

    async fn list_seasons(&self, series_id: &str) -> Result<Vec<LibrarySeason>> {
        tracing::debug!(series_id = %series_id, "Listing Jellyfin seasons");

        let path = format!("/Shows/{}/Seasons", urlencoding::encode(series_id));
        let items: Vec<JellyfinSeason> = self
            .get_items(&path, &[("Fields", "ChildCount")])
            .await?;

        Ok(items
            .into_iter()
            .map(|s| LibrarySeason {
                index: s.index_number,
                episode_count: s.child_count,
            })
            .collect())
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "Items", default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinSeries {
    id: String,
    name: String,
    #[serde(default)]
    provider_ids: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinSeason {
    #[serde(default)]
    index_number: Option<i64>,
    #[serde(default)]
    child_count: Option<i64>,
}

impl From<JellyfinSeries> for LibrarySeries {
    fn from(series: JellyfinSeries) -> Self {
        let catalog_id = series.provider_ids.and_then(|ids| {
            ids.into_iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(TMDB_PROVIDER_KEY))
                .map(|(_, value)| value)
        });

        Self {
            id: series.id,
            name: series.name,
            catalog_id,
        }
    }
}
