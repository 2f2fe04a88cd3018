//! Google Generative Language API client

use reqwest::Client;
use secrecy::ExposeSecret;

use super::{Provider, ProviderCapabilities, ProviderKind};
use crate::config::HttpConfig;
use crate::convert::{DecodedResponse, OutputFormat, google};
use crate::error::LlmError;
use crate::types::QueryRequest;

/// Default Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language API client
///
/// The model lands in the URL path and the key in the query string, per
/// this API's convention.
pub struct GoogleClient {
    config: HttpConfig,
    client: Client,
}

impl GoogleClient {
    /// Create a client against the default API endpoint
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(HttpConfig::new(DEFAULT_BASE_URL, api_key))
    }

    /// Create a client from an explicit configuration
    pub fn from_config(config: HttpConfig) -> Result<Self, LlmError> {
        let client = config.build_client()?;
        Ok(Self { config, client })
    }

    /// `generateContent` endpoint for the given model
    fn generate_url(&self, model: &str) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let key = self.config.api_key.expose_secret();
        format!("{base}/models/{model}:generateContent?key={key}")
    }
}

#[async_trait::async_trait]
impl Provider for GoogleClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: false,
            // inline data URIs only; HTTP image URLs are rejected at encode
            images: true,
            native_structured_output: true,
        }
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        output: &OutputFormat,
    ) -> Result<DecodedResponse, LlmError> {
        let wire = google::encode(request, output)?;
        let response = self
            .client
            .post(self.generate_url(&request.model))
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.kind(), error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })?;
        let body = super::read_success_body(self.kind(), response).await?;
        google::decode(&body)
    }
}
