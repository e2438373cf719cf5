//! Configuration module for seasonwatch.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub jellyfin: JellyfinConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty means same-origin only)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/seasonwatch.db")
}

/// TMDB API configuration
#[derive(Clone, Deserialize)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation to avoid exposing api_key
impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Jellyfin server configuration
#[derive(Clone, Deserialize)]
pub struct JellyfinConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation to avoid exposing api_key
impl std::fmt::Debug for JellyfinConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `SEASONWATCH_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `SEASONWATCH_SERVER__PORT=9000` sets `server.port`
    /// - `SEASONWATCH_TMDB__API_KEY=...` sets `tmdb.api_key`
    /// - `SEASONWATCH_JELLYFIN__URL=http://jellyfin:8096` sets `jellyfin.url`
    /// - `SEASONWATCH_SERVER__CORS_ORIGINS=http://a,http://b` sets `server.cors_origins`
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "./data/seasonwatch.db")?
            .set_default("tmdb.base_url", "https://api.themoviedb.org/3")?
            .set_default("tmdb.timeout_secs", 30)?
            .set_default("jellyfin.timeout_secs", 30)?
            .add_source(File::with_name(config_path).required(false))
            // SEASONWATCH_SERVER__PORT=9000 -> server.port = 9000
            .add_source(
                Environment::with_prefix("SEASONWATCH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;

        config.validate();

        Ok(config)
    }

    /// Warn about missing credentials.
    ///
    /// Startup is never refused: the affected client reports an upstream
    /// error when it is actually called.
    fn validate(&self) {
        if self.tmdb.api_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("TMDB API key not configured - catalog lookups will fail");
        }

        if self.jellyfin.url.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("Jellyfin URL not configured - library ingest will fail");
        }

        if self.jellyfin.api_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("Jellyfin API key not configured - library ingest will fail");
        }
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server.port)
    }
}
