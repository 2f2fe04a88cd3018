//! OpenAI Responses API wire format types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// -- Request types --

/// Responses API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesRequest {
    /// Model identifier
    pub model: String,
    /// System-level instructions (plain envelope only; the multimodal
    /// envelope carries instructions inside a system role message)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Input text or role-structured message list
    pub input: ResponsesInput,
    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Output text configuration; carries the structured-output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextConfig>,
    /// Tool declarations, built-in and function tools alike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Tool selection policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    /// Reasoning configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
}

/// Responses API input: plain text or a role-structured message list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsesInput {
    /// Plain text shorthand
    Text(String),
    /// Role-structured messages (multimodal envelope)
    Messages(Vec<InputMessage>),
}

/// One role-scoped message in the multimodal envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMessage {
    /// Role ("system" or "user")
    pub role: String,
    /// Content items
    pub content: Vec<InputContent>,
}

/// Content item inside a multimodal message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    /// Text content
    InputText {
        /// The text string
        text: String,
    },
    /// Image content
    InputImage {
        /// HTTP URL or base64 data URI
        image_url: String,
        /// Requested detail level ("auto", "low", "high")
        detail: String,
    },
}

/// `text` request block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Output format
    pub format: TextFormat,
}

/// Structured output format under `text.format`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFormat {
    /// Format type, always "json_schema"
    #[serde(rename = "type")]
    pub format_type: String,
    /// Schema name
    pub name: String,
    /// The JSON Schema the output must conform to
    pub schema: Value,
}

impl TextFormat {
    /// Structured output conforming to the given schema
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            format_type: "json_schema".to_owned(),
            name: name.into(),
            schema,
        }
    }
}

/// Reasoning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Effort level ("low", "medium", "high")
    pub effort: String,
    /// Summary verbosity ("auto", "concise", "detailed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// -- Response types --

/// Responses API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesResponse {
    /// Response identifier
    #[serde(default)]
    pub id: String,
    /// Model that served the request
    #[serde(default)]
    pub model: String,
    /// Output items in provider order
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<ResponsesUsage>,
}

/// One item in the response `output` list
///
/// Message items carry `content`; tool-call items (`function_call`,
/// `web_search_call`) carry their fields in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputItem {
    /// Item type ("message", "function_call", "web_search_call", ...)
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// Item identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Message content blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<OutputContent>>,
    /// Remaining item fields, preserved for tool-call extraction
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One content block inside a message output item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputContent {
    /// Block type ("output_text", "refusal", ...)
    #[serde(rename = "type", default)]
    pub content_type: String,
    /// Text payload, when the block carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Responses API token usage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsesUsage {
    /// Tokens in the input
    #[serde(default)]
    pub input_tokens: u32,
    /// Tokens in the output
    #[serde(default)]
    pub output_tokens: u32,
    /// Provider-reported total
    #[serde(default)]
    pub total_tokens: Option<u32>,
}
