//! Google Generative Language API wire format types
//!
//! Top-level request fields use snake_case; `generationConfig` and the
//! usage metadata use camelCase, matching the service's mixed convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// -- Request types --

/// `generateContent` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// System prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Conversation contents
    pub contents: Vec<GoogleContent>,
    /// Generation configuration
    #[serde(
        rename = "generationConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_config: Option<GenerationConfig>,
}

/// System prompt wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInstruction {
    /// Prompt parts
    pub parts: Vec<GooglePart>,
}

impl SystemInstruction {
    /// A single-part text system prompt
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![GooglePart::Text { text: text.into() }],
        }
    }
}

/// One content entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleContent {
    /// Role ("user" or "model"); optional on requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<GooglePart>,
}

/// One part of a content entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GooglePart {
    /// Text part
    Text {
        /// The text string
        text: String,
    },
    /// Inline image data part
    InlineData {
        /// The inline payload
        inline_data: GoogleInlineData,
    },
    /// Any part shape this client does not interpret (`functionCall`,
    /// future additions); skipped during text extraction
    Other(Value),
}

/// Inline binary payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleInlineData {
    /// Media type (e.g. "image/png")
    pub mime_type: String,
    /// Base64 payload with no data-URI prefix
    pub data: String,
}

/// `generationConfig` block (camelCase keys)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Response MIME type ("application/json" for structured output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// JSON Schema the response must conform to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<Value>,
}

// -- Response types --

/// `generateContent` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response identifier
    #[serde(default)]
    pub response_id: String,
    /// Model version that served the request
    #[serde(default)]
    pub model_version: String,
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    /// Token usage
    #[serde(default)]
    pub usage_metadata: Option<GoogleUsageMetadata>,
}

/// One generated candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCandidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<GoogleContent>,
    /// Why generation stopped
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

/// Token usage (camelCase keys)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsageMetadata {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Tokens across candidates
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Provider-reported total
    #[serde(default)]
    pub total_token_count: Option<u32>,
}
