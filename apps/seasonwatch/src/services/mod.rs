//! Application services for seasonwatch.

pub mod jellyfin;
pub mod reconcile;
pub mod tmdb;

pub use jellyfin::{JellyfinClient, LibraryProvider};
pub use tmdb::{CatalogProvider, TmdbClient};
