//! Checks applied to a loaded [`AppConfig`] before anything is built from it.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::config::AppConfig;

/// Accepted request timeout, in milliseconds.
pub const TIMEOUT_RANGE_MS: RangeInclusive<u64> = 100..=300_000;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_ERROR: failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("CONFIG_ERROR: invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("CONFIG_ERROR: missing {field} ({hint})")]
    Missing { field: &'static str, hint: &'static str },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

impl AppConfig {
    /// Reject values the transport or store could not work with.
    ///
    /// An empty collection passes: the controller reports it per operation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        if let Some((scheme, _)) = base_url.split_once("://")
            && !matches!(scheme, "http" | "https")
        {
            return Err(invalid("base_url", format!("unsupported scheme {scheme:?}")));
        }

        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("{} is outside {}..={}", self.timeout_ms, TIMEOUT_RANGE_MS.start(), TIMEOUT_RANGE_MS.end()),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if let Some(path) = &self.db_path
            && path.is_dir()
        {
            return Err(invalid("db_path", format!("{} is a directory", path.display())));
        }

        if self.collection.is_empty() {
            tracing::warn!(base_url = %self.base_url, "no collection configured; operations will be rejected");
        }
        if !self.caching && self.db_path.is_some() {
            tracing::warn!("caching is disabled; the cache database will be read but not written");
        }

        Ok(())
    }
}
