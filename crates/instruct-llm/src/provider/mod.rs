//! Provider trait and per-vendor client implementations

pub mod anthropic;
pub mod compat;
pub mod google;
pub mod openai;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::convert::{DecodedResponse, OutputFormat};
use crate::error::LlmError;
use crate::stream::EventStream;
use crate::types::{LlmResponse, QueryRequest};

pub use anthropic::AnthropicClient;
pub use compat::ChatCompatClient;
pub use google::GoogleClient;
pub use openai::OpenAiClient;

/// Provider identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
    Grok,
    DeepSeek,
    Llama,
}

/// Capabilities advertised by a provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderCapabilities {
    /// Whether the provider supports streaming responses
    pub streaming: bool,
    /// Whether the provider accepts image input
    pub images: bool,
    /// Whether structured output is enforced natively, as opposed to the
    /// synthetic-tool or prompt-injection strategies
    pub native_structured_output: bool,
}

/// Trait implemented by each LLM provider client
///
/// Streaming-vs-non-streaming is carried by the method called, never by
/// client state, so concurrent calls on one client cannot race.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which vendor this client talks to
    fn kind(&self) -> ProviderKind;

    /// Advertised capabilities
    fn capabilities(&self) -> ProviderCapabilities;

    /// Send a non-streaming query and normalize the response
    async fn execute(
        &self,
        request: &QueryRequest,
        output: &OutputFormat,
    ) -> Result<DecodedResponse, LlmError>;

    /// Send a streaming query, yielding normalized events
    ///
    /// Fails with [`LlmError::Unsupported`] before any network call on
    /// providers without a streaming implementation.
    async fn execute_stream(&self, request: &QueryRequest) -> Result<EventStream, LlmError> {
        let _ = request;
        Err(LlmError::Unsupported(format!(
            "streaming is not implemented for {}",
            self.kind()
        )))
    }
}

/// Typed query surface over any [`Provider`]
#[async_trait]
pub trait ProviderExt: Provider {
    /// Query for free-form text
    async fn query_text(&self, request: &QueryRequest) -> Result<LlmResponse<String>, LlmError> {
        self.execute(request, &OutputFormat::Text)
            .await?
            .into_text_response()
    }

    /// Query for a value conforming to the schema generated for `T`
    async fn query<T>(&self, request: &QueryRequest) -> Result<LlmResponse<T>, LlmError>
    where
        T: DeserializeOwned + JsonSchema + Send,
    {
        let format = OutputFormat::structured::<T>()?;
        self.execute(request, &format).await?.into_typed_response()
    }
}

impl<P: Provider + ?Sized> ProviderExt for P {}

/// Read a response body, mapping non-success statuses to upstream errors
pub(crate) async fn read_success_body(
    kind: ProviderKind,
    response: reqwest::Response,
) -> Result<String, LlmError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider = %kind, status = %status, "upstream returned error");
        return Err(LlmError::Upstream(format!(
            "provider returned {status}: {body}"
        )));
    }
    response
        .text()
        .await
        .map_err(|e| LlmError::Upstream(format!("failed to read response body: {e}")))
}

/// Check a streaming response's status before handing the body over
pub(crate) async fn ensure_success(
    kind: ProviderKind,
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider = %kind, status = %status, "upstream returned error");
        return Err(LlmError::Upstream(format!(
            "provider returned {status}: {body}"
        )));
    }
    Ok(response)
}
