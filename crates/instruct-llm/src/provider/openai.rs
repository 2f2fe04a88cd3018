//! OpenAI client: Responses API plus the legacy Chat Completions
//! streaming surface

use std::pin::Pin;

use futures_util::Stream;
use reqwest::Client;
use secrecy::ExposeSecret;

use super::{Provider, ProviderCapabilities, ProviderKind};
use crate::config::HttpConfig;
use crate::convert::chat::SchemaStrategy;
use crate::convert::{DecodedResponse, OutputFormat, chat, openai};
use crate::error::LlmError;
use crate::stream::{self, EventStream};
use crate::types::QueryRequest;

/// Default OpenAI API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client
pub struct OpenAiClient {
    config: HttpConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a client against the default API endpoint
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(HttpConfig::new(DEFAULT_BASE_URL, api_key))
    }

    /// Create a client from an explicit configuration
    pub fn from_config(config: HttpConfig) -> Result<Self, LlmError> {
        let client = config.build_client()?;
        Ok(Self { config, client })
    }

    /// Responses API endpoint
    fn responses_url(&self) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/responses")
    }

    /// Chat Completions endpoint (legacy streaming surface)
    fn completions_url(&self) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    async fn post(&self, url: String, body: &impl serde::Serialize) -> Result<reqwest::Response, LlmError> {
        self.client
            .post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.kind(), error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })
    }

    /// Stream plain text chunks over the legacy Chat Completions path
    ///
    /// A convenience over [`execute_stream`](Provider::execute_stream) for
    /// callers that only want incremental text.
    pub async fn stream_text(
        &self,
        request: &QueryRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>, LlmError> {
        let wire = chat::encode(request, &OutputFormat::Text, true, SchemaStrategy::JsonSchema)?;
        let response = self.post(self.completions_url(), &wire).await?;
        let response = super::ensure_success(self.kind(), response).await?;
        Ok(stream::text_deltas(stream::events(response)))
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: true,
            images: true,
            native_structured_output: true,
        }
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        output: &OutputFormat,
    ) -> Result<DecodedResponse, LlmError> {
        let wire = openai::encode(request, output, false);
        let response = self.post(self.responses_url(), &wire).await?;
        let body = super::read_success_body(self.kind(), response).await?;
        openai::decode(&body)
    }

    /// Stream normalized Responses API events
    async fn execute_stream(&self, request: &QueryRequest) -> Result<EventStream, LlmError> {
        let wire = openai::encode(request, &OutputFormat::Text, true);
        let response = self.post(self.responses_url(), &wire).await?;
        let response = super::ensure_success(self.kind(), response).await?;
        Ok(stream::events(response))
    }
}
