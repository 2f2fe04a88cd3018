//! Generic client for OpenAI-compatible chat-completions providers
//!
//! One client type covers Grok, DeepSeek, and Llama hosts; they differ
//! only in base URL and in how structured output is requested.

use reqwest::Client;
use secrecy::ExposeSecret;

use super::{Provider, ProviderCapabilities, ProviderKind};
use crate::config::HttpConfig;
use crate::convert::chat::{self, SchemaStrategy};
use crate::convert::{DecodedResponse, OutputFormat};
use crate::error::LlmError;
use crate::types::QueryRequest;

/// Default Grok API base URL
const GROK_BASE_URL: &str = "https://api.x.ai/v1";

/// Default DeepSeek API base URL
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Default Llama hosting (DeepInfra) base URL
const LLAMA_BASE_URL: &str = "https://api.deepinfra.com/v1/openai";

/// Client for an OpenAI-compatible chat-completions provider
pub struct ChatCompatClient {
    kind: ProviderKind,
    strategy: SchemaStrategy,
    config: HttpConfig,
    client: Client,
}

impl ChatCompatClient {
    /// Grok: native strict schema enforcement
    pub fn grok(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(
            ProviderKind::Grok,
            SchemaStrategy::JsonSchema,
            HttpConfig::new(GROK_BASE_URL, api_key),
        )
    }

    /// DeepSeek: schema injected into the system prompt
    pub fn deepseek(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(
            ProviderKind::DeepSeek,
            SchemaStrategy::SystemPrompt,
            HttpConfig::new(DEEPSEEK_BASE_URL, api_key),
        )
    }

    /// Llama on DeepInfra: schema injected into the system prompt
    pub fn llama(api_key: &str) -> Result<Self, LlmError> {
        Self::from_config(
            ProviderKind::Llama,
            SchemaStrategy::SystemPrompt,
            HttpConfig::new(LLAMA_BASE_URL, api_key),
        )
    }

    /// Create a client for any compatible endpoint
    pub fn from_config(
        kind: ProviderKind,
        strategy: SchemaStrategy,
        config: HttpConfig,
    ) -> Result<Self, LlmError> {
        let client = config.build_client()?;
        Ok(Self {
            kind,
            strategy,
            config,
            client,
        })
    }

    /// Chat Completions endpoint
    fn completions_url(&self) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait::async_trait]
impl Provider for ChatCompatClient {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: false,
            images: false,
            native_structured_output: self.strategy == SchemaStrategy::JsonSchema,
        }
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        output: &OutputFormat,
    ) -> Result<DecodedResponse, LlmError> {
        if request.contains_images() {
            return Err(LlmError::Unsupported(format!(
                "image input is not supported for {}",
                self.kind
            )));
        }

        let wire = chat::encode(request, output, false, self.strategy)?;
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.kind, error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })?;
        let body = super::read_success_body(self.kind, response).await?;
        chat::decode(&body)
    }
}
