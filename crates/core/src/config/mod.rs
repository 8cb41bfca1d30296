//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WIKICARD_*)
//! 2. TOML config file (if WIKICARD_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WIKICARD_*)
/// 2. TOML config file (if WIKICARD_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for wiki API requests.
    ///
    /// Set via WIKICARD_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP transport timeout in milliseconds.
    ///
    /// Set via WIKICARD_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Emoji shown in front of the pending-enrichment line.
    ///
    /// Set via WIKICARD_LOADING_MARKER environment variable.
    #[serde(default = "default_loading_marker")]
    pub loading_marker: String,

    /// chrono format string overriding the locale's date format.
    ///
    /// Set via WIKICARD_DATE_FORMAT environment variable.
    #[serde(default)]
    pub date_format: Option<String>,

    /// JSON file seeding the site registry.
    ///
    /// Set via WIKICARD_SITES_FILE environment variable.
    #[serde(default)]
    pub sites_file: Option<PathBuf>,
}

fn default_user_agent() -> String {
    "wikicard/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_loading_marker() -> String {
    "<a:loading:641343250661113886>".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            loading_marker: default_loading_marker(),
            date_format: None,
            sites_file: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WIKICARD_`
    /// 2. TOML file from `WIKICARD_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WIKICARD_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WIKICARD_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
