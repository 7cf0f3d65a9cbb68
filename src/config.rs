//! Client configuration loaded from environment variables.

use std::time::Duration;

use crate::api::DEFAULT_API_BASE;
use crate::error::HeroError;

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroConfig {
    /// Base URL the `/heroes` collection hangs off, without a trailing slash.
    pub base_url: String,
    /// Quiet interval before a search term is forwarded.
    pub search_debounce: Duration,
    /// Per-request timeout. `None` lets a hung request hang.
    pub request_timeout: Option<Duration>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_owned(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout: None,
        }
    }
}

impl HeroConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `HEROES_API_URL`: backend base URL (default `http://localhost:3000/api`)
    /// - `HEROES_SEARCH_DEBOUNCE_MS`: default 300
    /// - `HEROES_REQUEST_TIMEOUT_SECS`: unset means no timeout
    pub fn from_env() -> Result<Self, HeroError> {
        let base_url = std::env::var("HEROES_API_URL")
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_owned());

        let debounce_ms = parse_var("HEROES_SEARCH_DEBOUNCE_MS")?.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);
        let request_timeout = parse_var("HEROES_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            base_url,
            search_debounce: Duration::from_millis(debounce_ms),
            request_timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_var(key: &str) -> Result<Option<u64>, HeroError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| HeroError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
