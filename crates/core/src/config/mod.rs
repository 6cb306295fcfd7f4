//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HTTPCACHE_*)
//! 2. TOML config file (if HTTPCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::controller::CacheOptions;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HTTPCACHE_*)
/// 2. TOML config file (if HTTPCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote resource endpoint.
    ///
    /// Set via HTTPCACHE_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection to operate on.
    ///
    /// Set via HTTPCACHE_COLLECTION environment variable.
    #[serde(default)]
    pub collection: String,

    /// Optional domain prefix for the collection.
    ///
    /// Set via HTTPCACHE_DOMAIN environment variable.
    #[serde(default)]
    pub domain: String,

    /// Whether documents are written through to the local store.
    ///
    /// Set via HTTPCACHE_CACHING environment variable.
    #[serde(default = "default_true")]
    pub caching: bool,

    /// Path to a SQLite cache database. In-memory cache when unset.
    ///
    /// Set via HTTPCACHE_DB_PATH environment variable.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HTTPCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HTTPCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}

fn default_user_agent() -> String {
    "httpcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: String::new(),
            domain: String::new(),
            caching: true,
            db_path: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Controller options derived from this configuration.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions { collection: self.collection.clone(), domain: self.domain.clone(), caching: self.caching }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HTTPCACHE_`
    /// 2. TOML file from `HTTPCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// Values are not validated here so command-line overrides can be applied
    /// first; call [`validate`](Self::validate) before use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if the file cannot be read or a
    /// variable cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HTTPCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HTTPCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }

    /// Collection name, for commands that cannot run without one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no collection is configured.
    pub fn require_collection(&self) -> Result<&str, ConfigError> {
        if self.collection.is_empty() {
            return Err(ConfigError::Missing {
                field: "collection",
                hint: "set HTTPCACHE_COLLECTION or pass --collection",
            });
        }
        Ok(&self.collection)
    }
}
