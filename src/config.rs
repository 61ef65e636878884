use crate::app::ports::Session;
use crate::common::constants::*;
use crate::common::error::{CatalogError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
}

/// Prometheus exporter; off unless a port is configured
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIRECTORY)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
        }
    }
}

impl Config {
    /// Load from `EXAM_CATALOG_CONFIG` (or `config.toml`), then apply
    /// environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(
            env::var(ENV_API_URL).ok(),
            env::var(ENV_METRICS_PORT).ok(),
        )?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override the base URL and metrics port; blank values are ignored.
    pub fn apply_overrides(&mut self, api_url: Option<String>, metrics_port: Option<String>) -> Result<()> {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(port) = metrics_port.filter(|p| !p.trim().is_empty()) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| CatalogError::Config(format!("Invalid {} '{}': {}", ENV_METRICS_PORT, port, e)))?;
            self.metrics.port = Some(port);
        }
        Ok(())
    }
}

/// Session credential from `EXAM_CATALOG_TOKEN`, unless one is given explicitly
pub fn session_from_env(explicit: Option<String>) -> Session {
    Session::from_token(explicit.or_else(|| env::var(ENV_TOKEN).ok()))
}
