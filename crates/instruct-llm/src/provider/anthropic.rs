//! Anthropic Messages API client

use reqwest::Client;
use secrecy::ExposeSecret;

use super::{Provider, ProviderCapabilities, ProviderKind};
use crate::config::HttpConfig;
use crate::convert::{DecodedResponse, OutputFormat, anthropic};
use crate::error::LlmError;
use crate::types::QueryRequest;

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
pub struct AnthropicClient {
    config: HttpConfig,
    client: Client,
}

impl AnthropicClient {
    /// Create a client against the default API endpoint
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(HttpConfig::new(DEFAULT_BASE_URL, api_key))
    }

    /// Create a client from an explicit configuration
    pub fn from_config(config: HttpConfig) -> Result<Self, LlmError> {
        let client = config.build_client()?;
        Ok(Self { config, client })
    }

    /// Messages endpoint
    fn messages_url(&self) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/messages")
    }
}

#[async_trait::async_trait]
impl Provider for AnthropicClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: false,
            images: true,
            // structured output goes through the forced responseSchema tool
            native_structured_output: false,
        }
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        output: &OutputFormat,
    ) -> Result<DecodedResponse, LlmError> {
        let wire = anthropic::encode(request, output);
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.kind(), error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })?;
        let body = super::read_success_body(self.kind(), response).await?;
        anthropic::decode(&body)
    }
}
