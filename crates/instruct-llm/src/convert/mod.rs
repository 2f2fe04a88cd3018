//! Conversion between the uniform types and provider wire formats
//!
//! One transcoder per vendor: `encode` builds the wire request struct,
//! `decode` normalizes the response body into a [`DecodedResponse`].

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::types::{LlmResponse, ToolCall, Usage};

pub mod anthropic;
pub mod chat;
pub mod google;
pub mod openai;

/// Name attached to generated output schemas on the wire
pub const SCHEMA_NAME: &str = "response_schema";

/// What shape the caller expects the model output in
#[derive(Debug, Clone)]
pub enum OutputFormat {
    /// Free-form text; no schema mechanism is attached
    Text,
    /// Output constrained to the given JSON Schema
    Structured(Value),
}

impl OutputFormat {
    /// Structured output conforming to the schema generated for `T`
    pub fn structured<T: JsonSchema>() -> Result<Self, LlmError> {
        Ok(Self::Structured(instruct_schema::generate::<T>()?))
    }

    /// The schema, when this is a structured format
    pub const fn schema(&self) -> Option<&Value> {
        match self {
            Self::Text => None,
            Self::Structured(schema) => Some(schema),
        }
    }
}

/// Model output before typed interpretation
#[derive(Debug, Clone)]
pub enum RawOutput {
    /// Provider returned no text-bearing output
    None,
    /// Text extracted from the first non-empty text block
    Text(String),
    /// Already-structured JSON (Anthropic forced tool input)
    Json(Value),
}

/// A provider response normalized to the uniform shape, result not yet typed
#[derive(Debug, Clone)]
pub struct DecodedResponse {
    /// Provider response identifier
    pub id: String,
    /// Model that served the request
    pub model: String,
    /// Normalized token accounting
    pub usage: Usage,
    /// Extracted output
    pub output: RawOutput,
    /// Tool calls found in the completed response
    pub tool_calls: Vec<ToolCall>,
}

impl DecodedResponse {
    /// Finish as a plain-text response
    ///
    /// Absence of text is not an error for text queries; it yields an
    /// empty string, with any tool calls still captured.
    pub fn into_text_response(self) -> Result<LlmResponse<String>, LlmError> {
        let result = match self.output {
            RawOutput::None => String::new(),
            RawOutput::Text(text) => text,
            RawOutput::Json(value) => serde_json::to_string(&value)
                .map_err(|e| LlmError::Envelope(format!("unserializable output: {e}")))?,
        };
        Ok(LlmResponse {
            id: self.id,
            model: self.model,
            result,
            usage: self.usage,
            additional_data: tool_call_data(&self.tool_calls),
        })
    }

    /// Finish as a structured response decoded into `T`
    pub fn into_typed_response<T: DeserializeOwned>(self) -> Result<LlmResponse<T>, LlmError> {
        let result = match self.output {
            RawOutput::None => {
                return Err(LlmError::StructuredOutput(
                    "provider returned no output to decode".to_owned(),
                ));
            }
            RawOutput::Text(text) => serde_json::from_str(&text).map_err(|e| {
                LlmError::StructuredOutput(format!(
                    "output text did not match the requested type: {e}"
                ))
            })?,
            RawOutput::Json(value) => serde_json::from_value(value).map_err(|e| {
                LlmError::StructuredOutput(format!(
                    "output JSON did not match the requested type: {e}"
                ))
            })?,
        };
        Ok(LlmResponse {
            id: self.id,
            model: self.model,
            result,
            usage: self.usage,
            additional_data: tool_call_data(&self.tool_calls),
        })
    }
}

/// Tool calls as response additional data, empty when there were none
fn tool_call_data(calls: &[ToolCall]) -> Map<String, Value> {
    let mut data = Map::new();
    if !calls.is_empty() {
        if let Ok(value) = serde_json::to_value(calls) {
            data.insert(ToolCall::ADDITIONAL_DATA_KEY.to_owned(), value);
        }
    }
    data
}
