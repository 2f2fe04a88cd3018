//! The provider-agnostic response shape

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized token accounting
///
/// Providers disagree on field names and on whether a total is reported;
/// the total falls back to the sum when the provider omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens produced by the model
    pub response_tokens: u32,
    /// Provider-reported total, or the computed sum when absent
    pub total_tokens: u32,
}

impl Usage {
    /// Normalize provider counts, computing the total when not reported
    pub fn new(prompt_tokens: u32, response_tokens: u32, total_tokens: Option<u32>) -> Self {
        Self {
            prompt_tokens,
            response_tokens,
            total_tokens: total_tokens.unwrap_or(prompt_tokens + response_tokens),
        }
    }
}

/// A decoded provider response carrying a typed result
///
/// `result` is `String` for plain-text queries or a schema-conformant type
/// for structured queries. Provider extras that do not fit the uniform
/// shape, captured tool calls included, land in `additional_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse<T> {
    /// Provider response identifier
    pub id: String,
    /// Model that actually served the request
    pub model: String,
    /// The decoded result
    pub result: T,
    /// Normalized token accounting
    pub usage: Usage,
    /// Provider extras keyed by well-known names, e.g.
    /// [`ToolCall::ADDITIONAL_DATA_KEY`](super::ToolCall::ADDITIONAL_DATA_KEY)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_data: Map<String, Value>,
}

impl<T> LlmResponse<T> {
    /// Tool calls captured alongside the result, if any were present
    pub fn tool_calls(&self) -> Vec<super::ToolCall> {
        self.additional_data
            .get(super::ToolCall::ADDITIONAL_DATA_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}
