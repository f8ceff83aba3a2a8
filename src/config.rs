//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY` - provider API key (required)
//! - `GEMINI_BASE_URL` - provider origin (default: `https://generativelanguage.googleapis.com`)
//! - `GEMINI_MODEL` - model id (default: `gemini-1.5-flash-latest`)
//! - `BIND_ADDR` - listen address (default: `0.0.0.0:8080`)
//! - `DEVKIT_WEB_DIR` - static assets directory (default: `./web`)
//! - `DEVKIT_HTTP_TIMEOUT_SECONDS` - per-attempt outbound timeout (default: none)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_WEB_DIR: &str = "./web";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub bind_addr: String,
    pub web_dir: PathBuf,
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key =
            env_non_empty("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let http_timeout = match env_non_empty("DEVKIT_HTTP_TIMEOUT_SECONDS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "DEVKIT_HTTP_TIMEOUT_SECONDS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            gemini_api_key,
            gemini_base_url: env_non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gemini_model: env_non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            bind_addr: env_non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            web_dir: env_non_empty("DEVKIT_WEB_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_DIR)),
            http_timeout,
        })
    }
}

/// Trimmed value of `key`, or `None` when unset or blank.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
