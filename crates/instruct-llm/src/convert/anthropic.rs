//! Conversion between the uniform types and the Anthropic Messages API
//!
//! Anthropic has no response-format mechanism, so structured output goes
//! through a forced synthetic tool: the generated schema becomes the
//! `input_schema` of a tool named `responseSchema`, `tool_choice` forces
//! that tool, and the resulting `tool_use` block's `input` is the
//! structured result itself.

use super::{DecodedResponse, OutputFormat, RawOutput};
use crate::error::LlmError;
use crate::protocol::anthropic::{
    AnthropicContentBlock, AnthropicImageSource, AnthropicMessage, AnthropicRequest,
    AnthropicResponse, AnthropicResponseBlock, AnthropicTool, AnthropicToolChoice,
};
use crate::types::{QueryRequest, ToolCall, Usage};

/// Name of the synthetic structured-output tool
pub const SCHEMA_TOOL_NAME: &str = "responseSchema";

/// Default max tokens (the field is required by the API)
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// -- Encoding --

/// Encode a uniform request as a Messages API body
pub fn encode(request: &QueryRequest, output: &OutputFormat) -> AnthropicRequest {
    let structured = output.schema().is_some();

    let messages = if request.contains_images() {
        vec![AnthropicMessage::user_blocks(multimodal_blocks(
            request, structured,
        ))]
    } else if structured {
        vec![AnthropicMessage::user_text(schema_turn(request))]
    } else {
        vec![AnthropicMessage::user_text(request.input.clone())]
    };

    // The system prompt merges into the user turn on the structured path
    let system = (!structured && !request.instructions.is_empty())
        .then(|| request.instructions.clone());

    let (tools, tool_choice) = match output.schema() {
        Some(schema) => (
            Some(vec![AnthropicTool {
                name: SCHEMA_TOOL_NAME.to_owned(),
                description: Some("Return JSON matching the target schema.".to_owned()),
                input_schema: schema.clone(),
            }]),
            Some(AnthropicToolChoice::tool(SCHEMA_TOOL_NAME)),
        ),
        None => (None, None),
    };

    AnthropicRequest {
        model: request.model.clone(),
        max_tokens: DEFAULT_MAX_TOKENS,
        system,
        messages,
        temperature: request.temperature,
        tools,
        tool_choice,
    }
}

/// Merged single-turn prompt instructing the model to invoke the tool
fn schema_turn(request: &QueryRequest) -> String {
    let input_line = if request.input.trim().is_empty() {
        "No text input; see attached images.".to_owned()
    } else {
        format!("Input: {}", request.input.trim())
    };
    format!(
        "{}\n\n{input_line}\n\nPlease invoke the {SCHEMA_TOOL_NAME} tool to emit JSON matching the schema.",
        request.instructions.trim(),
    )
}

/// Content blocks for requests carrying images
fn multimodal_blocks(request: &QueryRequest, structured: bool) -> Vec<AnthropicContentBlock> {
    let mut blocks = Vec::new();

    let text = if structured {
        schema_turn(request)
    } else {
        request.input.clone()
    };
    if !text.is_empty() {
        blocks.push(AnthropicContentBlock::Text { text });
    }

    for image in &request.images {
        let source = match image.base64_payload() {
            Some(data) => AnthropicImageSource::Base64 {
                media_type: format!("image/{}", image.mime_subtype()),
                data: data.to_owned(),
            },
            None => AnthropicImageSource::Url {
                url: image.url.clone(),
            },
        };
        blocks.push(AnthropicContentBlock::Image { source });
    }

    blocks
}

// -- Decoding --

/// Decode a Messages API body into the uniform shape
///
/// A leading `tool_use` block's `input` is surfaced as JSON output
/// directly; no intermediate string decode happens.
pub fn decode(body: &str) -> Result<DecodedResponse, LlmError> {
    let envelope: AnthropicResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Envelope(format!("messages body did not parse: {e}")))?;

    if envelope.content.is_empty() {
        return Err(LlmError::Envelope(
            "response contained zero content blocks".to_owned(),
        ));
    }

    let mut output = RawOutput::None;
    let mut tool_calls = Vec::new();
    for block in envelope.content {
        match block {
            AnthropicResponseBlock::Text { text } => {
                if matches!(output, RawOutput::None) && !text.is_empty() {
                    output = RawOutput::Text(text);
                }
            }
            AnthropicResponseBlock::ToolUse { id, name, input } => {
                if matches!(output, RawOutput::None) {
                    output = RawOutput::Json(input.clone());
                }
                tool_calls.push(ToolCall {
                    id,
                    tool_type: "function".to_owned(),
                    name: Some(name),
                    arguments_json: serde_json::to_string(&input).ok(),
                    ..ToolCall::default()
                });
            }
            AnthropicResponseBlock::Other => {}
        }
    }

    let usage = envelope.usage.unwrap_or_default();
    Ok(DecodedResponse {
        id: envelope.id,
        model: envelope.model,
        usage: Usage::new(usage.input_tokens, usage.output_tokens, None),
        output,
        tool_calls,
    })
}
