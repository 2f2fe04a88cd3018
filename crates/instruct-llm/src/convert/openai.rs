//! Conversion between the uniform types and the OpenAI Responses API

use serde_json::{Value, json};

use super::{DecodedResponse, OutputFormat, RawOutput, SCHEMA_NAME};
use crate::error::LlmError;
use crate::protocol::openai::{
    InputContent, InputMessage, ReasoningConfig, ResponsesInput, ResponsesRequest,
    ResponsesResponse, TextConfig, TextFormat,
};
use crate::types::{ImageDetail, QueryRequest, ToolCall, ToolChoice, Usage};

// -- Encoding --

/// Encode a uniform request as a Responses API body
///
/// `stream` is threaded explicitly so concurrent streaming and
/// non-streaming calls never share state.
pub fn encode(request: &QueryRequest, output: &OutputFormat, stream: bool) -> ResponsesRequest {
    let (instructions, input) = if request.contains_images() {
        (None, ResponsesInput::Messages(multimodal_input(request)))
    } else {
        (
            Some(request.instructions.clone()),
            ResponsesInput::Text(request.input.clone()),
        )
    };

    ResponsesRequest {
        model: request.model.clone(),
        instructions,
        input,
        stream: Some(stream),
        temperature: request.temperature,
        text: output.schema().map(|schema| TextConfig {
            format: TextFormat::json_schema(SCHEMA_NAME, schema.clone()),
        }),
        tools: encode_tools(request),
        tool_choice: request.tool_choice.as_ref().map(encode_tool_choice),
        reasoning: request.reasoning.map(|r| ReasoningConfig {
            effort: r.effort.as_str().to_owned(),
            summary: r.summary.map(|s| s.as_str().to_owned()),
        }),
    }
}

/// Role-structured input for requests carrying images
fn multimodal_input(request: &QueryRequest) -> Vec<InputMessage> {
    let system = InputMessage {
        role: "system".to_owned(),
        content: vec![InputContent::InputText {
            text: request.instructions.clone(),
        }],
    };

    let mut user_content = Vec::new();
    if !request.input.is_empty() {
        user_content.push(InputContent::InputText {
            text: request.input.clone(),
        });
    }
    for image in &request.images {
        user_content.push(InputContent::InputImage {
            image_url: image.url.clone(),
            detail: detail_str(image.detail).to_owned(),
        });
    }

    vec![
        system,
        InputMessage {
            role: "user".to_owned(),
            content: user_content,
        },
    ]
}

/// Map the uniform detail level onto the Responses API vocabulary
///
/// There is no medium level on this API; medium rounds up to high.
const fn detail_str(detail: ImageDetail) -> &'static str {
    match detail {
        ImageDetail::Auto => "auto",
        ImageDetail::Low => "low",
        ImageDetail::Medium | ImageDetail::High => "high",
    }
}

/// Built-in tool entries from request flags plus caller-declared specs
fn encode_tools(request: &QueryRequest) -> Option<Vec<Value>> {
    let mut tools = Vec::new();

    if let Some(search) = &request.web_search {
        let mut entry = json!({
            "type": "web_search",
            "search_context_size": search.context_size.as_str(),
        });
        if let Some(country) = &search.user_country {
            entry["user_location"] = json!({
                "type": "approximate",
                "country": country,
            });
        }
        tools.push(entry);
    }
    if request.file_search {
        tools.push(json!({"type": "file_search"}));
    }
    if request.image_generation {
        tools.push(json!({"type": "image_generation"}));
    }
    if request.code_interpreter {
        tools.push(json!({"type": "code_interpreter", "container": {"type": "auto"}}));
    }
    if request.computer_use {
        tools.push(json!({"type": "computer_use_preview"}));
    }
    for spec in &request.tools {
        tools.push(spec.to_wire());
    }

    (!tools.is_empty()).then_some(tools)
}

fn encode_tool_choice(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::Auto => json!("auto"),
        ToolChoice::None => json!("none"),
        ToolChoice::Function(name) => json!({"type": "function", "name": name}),
    }
}

// -- Decoding --

/// Decode a Responses API body into the uniform shape
///
/// Scans output items in provider order for the first non-empty text block;
/// completed tool-call items are captured alongside.
pub fn decode(body: &str) -> Result<DecodedResponse, LlmError> {
    let envelope: ResponsesResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Envelope(format!("responses body did not parse: {e}")))?;

    if envelope.output.is_empty() {
        return Err(LlmError::Envelope(
            "response contained zero output items".to_owned(),
        ));
    }

    let mut text = None;
    let mut tool_calls = Vec::new();
    for item in &envelope.output {
        if item.item_type.is_empty() || item.item_type == "message" {
            if text.is_none() {
                text = item.content.iter().flatten().find_map(|block| {
                    block
                        .text
                        .as_ref()
                        .filter(|t| !t.is_empty())
                        .map(String::clone)
                });
            }
        } else if let Ok(value) = serde_json::to_value(item) {
            if let Some(call) = ToolCall::from_value(&value) {
                tool_calls.push(call);
            }
        }
    }

    let usage = envelope.usage.unwrap_or_default();
    Ok(DecodedResponse {
        id: envelope.id,
        model: envelope.model,
        usage: Usage::new(usage.input_tokens, usage.output_tokens, usage.total_tokens),
        output: match text {
            Some(text) => RawOutput::Text(text),
            None => RawOutput::None,
        },
        tool_calls,
    })
}
