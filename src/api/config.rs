//! Configuration for the backend API connection.

use std::time::Duration;

use url::Url;

use super::error::{ApiError, ApiResult};

/// Environment variable holding a full base URL override.
pub const API_URL_ENV: &str = "QA_CHAT_API_URL";

/// Environment variable holding just a host name; the backend is assumed
/// to listen on [`ApiConfig::DEFAULT_API_PORT`] over HTTPS on that host.
pub const API_HOST_ENV: &str = "QA_CHAT_API_HOST";

/// Connection settings for the backend API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are joined onto.
    pub base_url: Url,
    /// Timeout for the health check.
    pub health_timeout: Duration,
    /// Timeout for session and message listing/creation calls.
    pub request_timeout: Duration,
    /// Timeout for message sending; longest because it waits on assistant
    /// generation.
    pub send_timeout: Duration,
}

impl ApiConfig {
    /// Default base URL for local development.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3001";

    /// Port assumed by the same-host heuristic.
    pub const DEFAULT_API_PORT: u16 = 3001;

    /// Build a config for the given base URL. Trailing slashes are
    /// trimmed so endpoint paths join cleanly.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Client(format!(
                "base URL must be absolute: {trimmed}"
            )));
        }
        Ok(Self {
            base_url,
            health_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(60),
        })
    }

    /// Resolve the base URL from the environment:
    /// [`API_URL_ENV`] if set, else [`API_HOST_ENV`] mapped to
    /// `https://{host}:3001`, else [`Self::DEFAULT_BASE_URL`].
    ///
    /// # Errors
    /// Returns an error if the resolved URL does not parse.
    pub fn resolve() -> ApiResult<Self> {
        let raw = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                std::env::var(API_HOST_ENV)
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map(|host| format!("https://{host}:{}", Self::DEFAULT_API_PORT))
            })
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        Self::new(&raw)
    }

    /// Override the send timeout.
    #[must_use]
    pub const fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Override the general request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Link to the backend's interactive API docs, derived from the base
    /// URL. Shown in the header for manual verification.
    #[must_use]
    pub fn docs_url(&self) -> String {
        format!("{}/docs", self.base_url.as_str().trim_end_matches('/'))
    }
}
