//! Bootstrap configuration loading
//!
//! Settings sources priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! This module owns tier 3 and 4. The binary layers CLI and environment on top.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default Echo Nest API root
pub const DEFAULT_ECHONEST_BASE_URL: &str = "http://developer.echonest.com/api/v4";

/// Configuration loaded from TOML file
///
/// Every key is optional. A missing key falls back to its built-in default.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Echo Nest API key (lowest priority source)
    #[serde(default)]
    pub echonest_key: Option<String>,

    /// Echo Nest API root URL
    #[serde(default = "default_echonest_base_url")]
    pub echonest_base_url: String,

    /// Minimum spacing between outbound term lookups, in milliseconds
    ///
    /// Default: 667 (1.5 requests per second)
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Terms weighted below this are not used as genres
    #[serde(default = "default_min_term_weight")]
    pub min_term_weight: f64,

    /// Per-request timeout for term lookups, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// File extensions to tag (case-insensitive, leading dot optional)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            echonest_key: None,
            echonest_base_url: default_echonest_base_url(),
            rate_limit_ms: default_rate_limit_ms(),
            min_term_weight: default_min_term_weight(),
            request_timeout_secs: default_request_timeout_secs(),
            extensions: default_extensions(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate value ranges
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_term_weight) {
            return Err(Error::Config(format!(
                "min_term_weight must be within 0.0..=1.0, got {}",
                self.min_term_weight
            )));
        }

        if self.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(Error::Config(
                "extensions must name at least one file extension".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_echonest_base_url() -> String {
    DEFAULT_ECHONEST_BASE_URL.to_string()
}

fn default_rate_limit_ms() -> u64 {
    667
}

fn default_min_term_weight() -> f64 {
    0.5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location: `<config dir>/tagdog/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tagdog").join("config.toml"))
}

/// Load TOML configuration
///
/// An explicitly requested file must exist. When no path is given the platform
/// default is tried, and a missing default file yields built-in defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = TomlConfig::from_toml_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}
