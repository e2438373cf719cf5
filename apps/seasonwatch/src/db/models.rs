use serde::{Deserialize, Serialize};

/// A tracked show, keyed by its TMDB id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub catalog_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub created_at: String,
}

/// A season of a tracked show as observed in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub show_id: i64,
    pub season_number: i64,
    pub episode_count: Option<i64>,
    pub created_at: String,
}

/// A library series, with its TMDB id once resolved.
///
/// `catalog_id` is a weak reference to [`Show::catalog_id`]: it is only used
/// for lookups and the database does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryShow {
    pub id: i64,
    pub library_id: String,
    pub catalog_id: Option<i64>,
    pub title: String,
    pub created_at: String,
}

/// A tracked show joined with the highest-numbered season known locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowWithLatestSeason {
    #[serde(flatten)]
    pub show: Show,
    pub latest_library_season: Option<i64>,
    pub latest_library_episodes: Option<i64>,
}
