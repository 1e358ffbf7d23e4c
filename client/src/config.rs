//! Client configuration
//!
//! Defaults can be overridden from the environment (after loading `.env`)
//! and then from command line flags in the binary.

use std::env;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const ENV_BASE_URL: &str = "FPL_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "FPL_API_TIMEOUT_SECS";
pub const ENV_TOP_PLAYERS_LIMIT: &str = "FPL_TOP_PLAYERS_LIMIT";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TOP_PLAYERS_LIMIT: u32 = 10;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the optimizer service, without a trailing slash
    pub base_url: String,
    /// Per-request timeout applied by the HTTP client
    pub timeout: Duration,
    /// `limit` sent with top-players queries
    pub top_players_limit: u32,
    /// How often the background sweeper evicts idle cache entries
    pub sweep_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            top_players_limit: DEFAULT_TOP_PLAYERS_LIMIT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with any `FPL_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ClientError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var(ENV_TOP_PLAYERS_LIMIT) {
            config.top_players_limit = raw.trim().parse::<u32>().map_err(|_| {
                ClientError::config(format!("{ENV_TOP_PLAYERS_LIMIT} must be a positive integer, got {raw:?}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_top_players_limit(mut self, limit: u32) -> Self {
        self.top_players_limit = limit;
        self
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::config("base URL must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::config(format!(
                "base URL must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::config("timeout must be greater than zero"));
        }
        if self.top_players_limit == 0 {
            return Err(ClientError::config("top players limit must be greater than zero"));
        }
        Ok(())
    }
}

/// Trim whitespace and trailing slashes; bare `host:port` gets `http://`
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
