//! Per-client HTTP configuration

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::SecretString;
use url::Url;

use crate::error::LlmError;

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("instruct-llm/", env!("CARGO_PKG_VERSION"));

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Static per-provider HTTP configuration
///
/// Set once at client construction; clients hold no other mutable state, so
/// concurrent queries on one client never race on configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Provider API base URL
    pub base_url: Url,
    /// API key, kept out of debug output
    pub api_key: SecretString,
    /// Request timeout applied to the whole exchange
    pub timeout: Duration,
}

impl HttpConfig {
    /// Create a configuration for a known base URL
    ///
    /// # Panics
    ///
    /// Panics if `base_url` is not a valid URL; callers pass hardcoded
    /// provider defaults here.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).expect("valid provider base URL"),
            api_key: SecretString::from(api_key.to_owned()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL (e.g. to point at a proxy or mock)
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the reqwest client for this configuration
    pub fn build_client(&self) -> Result<Client, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))
    }
}
