//! Configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{ClientConfig, DEFAULT_API_BASE};
use crate::models::MAX_PAGE_SIZE;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Environment variable overriding the API root.
pub const API_BASE_ENV: &str = "WATCHTIME_API_BASE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// YouTube Data API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key. Prefer the `YOUTUBE_API_KEY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Playlist page size (1..=50)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_results() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_results: default_max_results(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fixed UTC offset used when rendering publish dates
    #[serde(default = "default_utc_offset")]
    pub display_utc_offset_hours: i32,

    #[serde(default)]
    pub youtube: YouTubeConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset() -> i32 {
    -5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            display_utc_offset_hours: default_utc_offset(),
            youtube: YouTubeConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults, then
    /// apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.youtube.api_key = Some(key);
        }
        if let Some(base) = lookup(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            self.youtube.base_url = base;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.youtube.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "YouTube timeout must be greater than 0".to_string(),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.youtube.max_results) {
            return Err(ConfigError::ValidationError(format!(
                "max_results must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if url::Url::parse(&self.youtube.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid YouTube base URL: {}",
                self.youtube.base_url
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !(-12..=14).contains(&self.display_utc_offset_hours) {
            return Err(ConfigError::ValidationError(
                "display_utc_offset_hours must be between -12 and 14".to_string(),
            ));
        }

        Ok(())
    }

    /// Metadata client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: self.youtube.api_key.clone(),
            base_url: self.youtube.base_url.clone(),
            timeout: Duration::from_secs(self.youtube.timeout_seconds),
            max_results: self.youtube.max_results,
            ..Default::default()
        }
    }
}
