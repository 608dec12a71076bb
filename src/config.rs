//! Configuration of the reservation API client.

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where and how to reach the reservation API.
///
/// ```rust
/// use provider_console::ApiConfig;
/// use std::time::Duration;
///
/// let config = ApiConfig::new("https://api.example.com".parse().unwrap())
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.endpoint("stores/me/owner/"), "https://api.example.com/stores/me/owner/");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `PROVIDER_API_BASE_URL`: base URL of the reservation API
    ///
    /// # Optional env vars
    /// - `PROVIDER_API_TIMEOUT_SECS`: request timeout in seconds (default 10)
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the base URL is missing or any value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("PROVIDER_API_BASE_URL")
            .map_err(|_| Error::Missing("PROVIDER_API_BASE_URL"))?;
        let base_url: Url = base_url.parse().map_err(|e: url::ParseError| Error::Invalid {
            var: "PROVIDER_API_BASE_URL",
            reason: e.to_string(),
        })?;

        let mut config = Self::new(base_url);

        if let Ok(secs) = std::env::var("PROVIDER_API_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e: std::num::ParseIntError| {
                Error::Invalid {
                    var: "PROVIDER_API_TIMEOUT_SECS",
                    reason: e.to_string(),
                }
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins `path` onto the base URL, keeping any path the base already has.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
