//! Conversion between the uniform types and the Google Generative Language
//! API

use super::{DecodedResponse, OutputFormat, RawOutput};
use crate::error::LlmError;
use crate::protocol::google::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GoogleContent,
    GoogleInlineData, GooglePart, SystemInstruction,
};
use crate::types::{QueryRequest, Usage};

// -- Encoding --

/// Encode a uniform request as a `generateContent` body
///
/// Images must be inline data URIs; the API takes no image URLs on this
/// path, so an HTTP image reference fails before any network call.
pub fn encode(
    request: &QueryRequest,
    output: &OutputFormat,
) -> Result<GenerateContentRequest, LlmError> {
    let mut parts = Vec::new();
    if !request.input.is_empty() {
        parts.push(GooglePart::Text {
            text: request.input.clone(),
        });
    }
    for image in &request.images {
        let Some(data) = image.base64_payload() else {
            return Err(LlmError::Unsupported(
                "image URLs are not supported here; inline the image as a data URI".to_owned(),
            ));
        };
        parts.push(GooglePart::InlineData {
            inline_data: GoogleInlineData {
                mime_type: format!("image/{}", image.mime_subtype()),
                data: data.to_owned(),
            },
        });
    }

    let structured_config = output.schema().map(|schema| {
        (
            "application/json".to_owned(),
            schema.clone(),
        )
    });
    let generation_config = if request.temperature.is_some() || structured_config.is_some() {
        let (mime, schema) = match structured_config {
            Some((mime, schema)) => (Some(mime), Some(schema)),
            None => (None, None),
        };
        Some(GenerationConfig {
            temperature: request.temperature,
            response_mime_type: mime,
            response_json_schema: schema,
        })
    } else {
        None
    };

    Ok(GenerateContentRequest {
        system_instruction: (!request.instructions.is_empty())
            .then(|| SystemInstruction::text(request.instructions.clone())),
        contents: vec![GoogleContent { role: None, parts }],
        generation_config,
    })
}

// -- Decoding --

/// Decode a `generateContent` body into the uniform shape
pub fn decode(body: &str) -> Result<DecodedResponse, LlmError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Envelope(format!("generateContent body did not parse: {e}")))?;

    if envelope.candidates.is_empty() {
        return Err(LlmError::Envelope(
            "response contained zero candidates".to_owned(),
        ));
    }

    let text = envelope
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .find_map(|part| match part {
            GooglePart::Text { text } if !text.is_empty() => Some(text.clone()),
            _ => None,
        });

    let usage = envelope.usage_metadata.unwrap_or_default();
    Ok(DecodedResponse {
        id: envelope.response_id,
        model: envelope.model_version,
        usage: Usage::new(
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count,
        ),
        output: match text {
            Some(text) => RawOutput::Text(text),
            None => RawOutput::None,
        },
        tool_calls: Vec::new(),
    })
}
