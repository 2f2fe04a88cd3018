//! Conversion between the uniform types and the Chat Completions format
//!
//! Shared by the OpenAI legacy streaming path and the OpenAI-compatible
//! providers. Structured output is strategy-driven: providers with native
//! schema support get `response_format: json_schema`, the rest get the
//! schema injected into the system prompt plus `json_object` mode.

use super::{DecodedResponse, OutputFormat, RawOutput, SCHEMA_NAME};
use crate::error::LlmError;
use crate::protocol::chat::{
    ChatMessage, ChatRequest, ChatResponse, JsonSchemaFormat, ResponseFormat,
};
use crate::types::{QueryRequest, ToolCall, Usage};

/// How a chat-completions provider is told to produce schema-conformant
/// output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStrategy {
    /// Provider enforces the schema natively via `response_format`
    JsonSchema,
    /// Schema is appended to the system prompt; provider only guarantees
    /// well-formed JSON via `json_object` mode
    SystemPrompt,
}

// -- Encoding --

/// Encode a uniform request as a Chat Completions body
pub fn encode(
    request: &QueryRequest,
    output: &OutputFormat,
    stream: bool,
    strategy: SchemaStrategy,
) -> Result<ChatRequest, LlmError> {
    let mut system = request.instructions.clone();
    let mut response_format = None;

    if let Some(schema) = output.schema() {
        match strategy {
            SchemaStrategy::JsonSchema => {
                response_format = Some(ResponseFormat::JsonSchema {
                    json_schema: JsonSchemaFormat {
                        name: SCHEMA_NAME.to_owned(),
                        strict: true,
                        schema: schema.clone(),
                    },
                });
            }
            SchemaStrategy::SystemPrompt => {
                let schema_text = serde_json::to_string_pretty(schema)
                    .map_err(|e| LlmError::Envelope(format!("unserializable schema: {e}")))?;
                system = format!(
                    "{system} !!!Important: Respond ONLY with JSON matching this schema:\n\n{schema_text}"
                );
                response_format = Some(ResponseFormat::JsonObject);
            }
        }
    }

    let mut messages = Vec::new();
    if !system.is_empty() {
        messages.push(ChatMessage::system(system));
    }
    if !request.input.is_empty() {
        messages.push(ChatMessage::user(request.input.clone()));
    }

    Ok(ChatRequest {
        model: request.model.clone(),
        messages,
        temperature: request.temperature,
        stream: stream.then_some(true),
        response_format,
    })
}

// -- Decoding --

/// Decode a Chat Completions body into the uniform shape
pub fn decode(body: &str) -> Result<DecodedResponse, LlmError> {
    let envelope: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Envelope(format!("chat completions body did not parse: {e}")))?;

    if envelope.choices.is_empty() {
        return Err(LlmError::Envelope(
            "response contained zero choices".to_owned(),
        ));
    }

    let text = envelope.choices.iter().find_map(|choice| {
        choice
            .message
            .content
            .as_ref()
            .filter(|c| !c.is_empty())
            .cloned()
    });
    let tool_calls = envelope
        .choices
        .iter()
        .filter_map(|choice| choice.message.tool_calls.as_ref())
        .flatten()
        .filter_map(ToolCall::from_value)
        .collect();

    let usage = envelope.usage.unwrap_or_default();
    Ok(DecodedResponse {
        id: envelope.id,
        model: envelope.model,
        usage: Usage::new(
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        ),
        output: match text {
            Some(text) => RawOutput::Text(text),
            None => RawOutput::None,
        },
        tool_calls,
    })
}
