//! Configuration resolution for tagdog
//!
//! Layers CLI flags and environment variables over the TOML bootstrap config.
//!
//! **Priority:** CLI → ENV → TOML → built-in default

use std::time::Duration;
use tagdog_common::config::TomlConfig;
use tagdog_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable holding the Echo Nest API key
pub const ECHONEST_KEY_ENV: &str = "TAGDOG_ECHONEST_KEY";

/// Resolve the Echo Nest API key
///
/// **Priority:** CLI → ENV → TOML
pub fn resolve_echonest_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(ECHONEST_KEY_ENV).ok();

    let candidates = [
        ("command line", cli_key.map(str::to_string)),
        ("environment", env_key),
        ("TOML", toml_config.echonest_key.clone()),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    // Warn if multiple sources (potential misconfiguration)
    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "Echo Nest API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("Echo Nest API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(format!(
            "Echo Nest API key not configured. Provide one of:\n\
             1. Command line: --echonest-key <key>\n\
             2. Environment: {}=<key>\n\
             3. TOML config: echonest_key = \"<key>\"",
            ECHONEST_KEY_ENV
        ))),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Runtime settings for the tagging pipeline, derived from TOML config
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub echonest_base_url: String,
    pub rate_limit: Duration,
    pub min_term_weight: f64,
    pub request_timeout: Duration,
    pub extensions: Vec<String>,
}

impl PipelineSettings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            echonest_base_url: config.echonest_base_url.clone(),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
            min_term_weight: config.min_term_weight,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            extensions: config.extensions.clone(),
        }
    }
}
