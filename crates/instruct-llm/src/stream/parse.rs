//! Pure classification of SSE frames into normalized stream events

use serde_json::Value;

use crate::types::{StreamActivity, StreamEvent, StreamEventType, ToolCall};

/// Event name carried by an SSE frame, when one was actually present
///
/// The SSE default event name ("message") and the empty string both mean
/// the frame carried no `event:` line.
pub fn resolve_event_name(frame_event: &str) -> Option<&str> {
    match frame_event {
        "" | "message" => None,
        name => Some(name),
    }
}

/// Classify one JSON frame payload into a normalized event
///
/// Pure: the same name and payload always produce the same event, so
/// re-parsing a stream yields an identical event sequence.
pub fn classify(event_name: Option<&str>, payload: Value) -> StreamEvent {
    // Fall back to the payload's own discriminator
    let name = event_name
        .map(str::to_owned)
        .or_else(|| payload.get("type").and_then(Value::as_str).map(str::to_owned));

    let Some(name) = name else {
        // Legacy chat-completions frames carry neither an event name nor a
        // type field, just choices[0].delta
        if let Some(delta) = legacy_delta(&payload) {
            return StreamEvent {
                raw_event_name: String::new(),
                event_type: StreamEventType::LegacyChatCompletionsDelta,
                activity: StreamActivity::StreamingText,
                text_delta: delta
                    .get("content")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                reasoning_delta: None,
                tool_call: legacy_tool_fragment(delta),
                status: None,
                payload,
            };
        }
        return StreamEvent {
            raw_event_name: String::new(),
            event_type: StreamEventType::Unknown,
            activity: StreamActivity::Unknown,
            text_delta: None,
            reasoning_delta: None,
            tool_call: None,
            status: None,
            payload,
        };
    };

    let event_type = StreamEventType::from_name(&name);
    let reasoning = matches!(
        event_type,
        StreamEventType::ReasoningDelta | StreamEventType::ReasoningDone
    );

    let text_delta = if reasoning {
        None
    } else {
        extract_text_delta(&payload)
    };
    let reasoning_delta = extract_reasoning_delta(&payload, reasoning);
    let mut tool_call = extract_tool_fragment(&payload, event_type.is_tool_related());
    if tool_call.is_none() && name.starts_with("response.web_search_call") {
        // These frames carry only item identity, no tool object
        tool_call = Some(web_search_identity(&payload));
    }

    let activity = StreamActivity::derive(
        event_type,
        tool_call.as_ref().map(|call| call.tool_type.as_str()),
    );

    StreamEvent {
        raw_event_name: name,
        event_type,
        activity,
        text_delta,
        reasoning_delta,
        tool_call,
        status: extract_status(&payload),
        payload,
    }
}

/// `choices[0].delta` of a legacy chat-completions frame
fn legacy_delta(payload: &Value) -> Option<&Value> {
    payload.get("choices")?.get(0)?.get("delta")
}

/// Tool-call fragment inside a legacy delta
fn legacy_tool_fragment(delta: &Value) -> Option<ToolCall> {
    delta
        .get("tool_calls")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find_map(ToolCall::from_value)
}

/// Incremental output text, by payload shape priority
fn extract_text_delta(payload: &Value) -> Option<String> {
    let delta = payload.get("delta")?;
    if let Some(text) = delta.as_str() {
        return Some(text.to_owned());
    }
    for key in ["text", "content", "output_text"] {
        if let Some(text) = delta.get(key).and_then(Value::as_str) {
            return Some(text.to_owned());
        }
    }
    if let Some(chunks) = delta.as_array() {
        return Some(chunks.iter().filter_map(chunk_text).collect());
    }
    None
}

/// Incremental reasoning text, by payload shape priority
///
/// `from_string_delta` is set for reasoning-typed events, where a bare
/// string `delta` is the reasoning itself rather than output text.
fn extract_reasoning_delta(payload: &Value, from_string_delta: bool) -> Option<String> {
    if let Some(delta) = payload.get("delta") {
        if from_string_delta {
            if let Some(text) = delta.as_str() {
                return Some(text.to_owned());
            }
        }
        if let Some(reasoning) = delta.get("reasoning") {
            if let Some(text) = reasoning.as_str() {
                return Some(text.to_owned());
            }
            if let Some(text) = reasoning.get("text").and_then(Value::as_str) {
                return Some(text.to_owned());
            }
        }
        if let Some(chunks) = delta.get("reasoning_output_text").and_then(Value::as_array) {
            return Some(chunks.iter().filter_map(chunk_text).collect());
        }
    }
    payload
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Text of one delta array chunk: a bare string or a `{text}` object
fn chunk_text(chunk: &Value) -> Option<String> {
    chunk
        .as_str()
        .map(str::to_owned)
        .or_else(|| chunk.get("text").and_then(Value::as_str).map(str::to_owned))
}

/// Tool-call fragment, by payload shape priority
///
/// `tool_event` gates the ambiguous string-delta shape: text and reasoning
/// frames carry an `item_id` too, and their deltas are not argument text.
fn extract_tool_fragment(payload: &Value, tool_event: bool) -> Option<ToolCall> {
    if let Some(delta) = payload.get("delta") {
        if let Some(calls) = delta.get("tool_calls").and_then(Value::as_array) {
            if let Some(call) = calls.iter().find_map(ToolCall::from_value) {
                return Some(call);
            }
        }
        if let Some(search) = delta.get("web_search_call") {
            if let Some(call) = as_web_search(search) {
                return Some(call);
            }
        }
    }

    if let Some(call) = streamed_arguments(payload, tool_event) {
        return Some(call);
    }
    if let Some(call) = payload.get("function_call").and_then(ToolCall::from_value) {
        return Some(call);
    }
    if let Some(call) = payload.get("web_search_call").and_then(as_web_search) {
        return Some(call);
    }
    payload
        .get("output")
        .and_then(|o| o.get("tool_call"))
        .and_then(ToolCall::from_value)
}

/// Incrementally streamed function-call arguments
///
/// Covers `function_call_arguments` and bare `arguments` fields, plus the
/// argument text arriving as a string `delta` on a tool-related frame that
/// carries item identity.
fn streamed_arguments(payload: &Value, tool_event: bool) -> Option<ToolCall> {
    let arguments = payload
        .get("function_call_arguments")
        .or_else(|| payload.get("arguments"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| {
            if !tool_event {
                return None;
            }
            payload.get("item_id")?;
            payload
                .get("delta")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })?;

    Some(ToolCall {
        id: payload
            .get("item_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        call_id: payload
            .get("call_id")
            .and_then(Value::as_str)
            .map(str::to_owned),
        tool_type: "function".to_owned(),
        arguments_json: Some(arguments),
        output_index: payload
            .get("output_index")
            .and_then(Value::as_u64)
            .and_then(|i| u32::try_from(i).ok()),
        ..ToolCall::default()
    })
}

/// Normalize a web-search call object, forcing its tool type
fn as_web_search(value: &Value) -> Option<ToolCall> {
    let mut call = ToolCall::from_value(value)?;
    call.tool_type = "web_search".to_owned();
    Some(call)
}

/// Identity-only fragment for web-search lifecycle frames
fn web_search_identity(payload: &Value) -> ToolCall {
    ToolCall {
        id: payload
            .get("item_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        tool_type: "web_search".to_owned(),
        output_index: payload
            .get("output_index")
            .and_then(Value::as_u64)
            .and_then(|i| u32::try_from(i).ok()),
        ..ToolCall::default()
    }
}

/// Provider-reported status, top-level or nested under `response`
fn extract_status(payload: &Value) -> Option<String> {
    payload
        .get("status")
        .or_else(|| payload.get("response")?.get("status"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_delta_frame_without_event_name() {
        let event = classify(None, json!({"choices": [{"delta": {"content": "ab"}}]}));
        assert_eq!(event.event_type, StreamEventType::LegacyChatCompletionsDelta);
        assert_eq!(event.activity, StreamActivity::StreamingText);
        assert_eq!(event.text_delta.as_deref(), Some("ab"));
    }

    #[test]
    fn payload_type_field_resolves_when_no_event_line() {
        let event = classify(
            None,
            json!({"type": "response.output_text.delta", "delta": "hi"}),
        );
        assert_eq!(event.raw_event_name, "response.output_text.delta");
        assert_eq!(event.event_type, StreamEventType::OutputTextDelta);
        assert_eq!(event.text_delta.as_deref(), Some("hi"));
    }

    #[test]
    fn explicit_event_name_wins_over_payload_type() {
        let event = classify(
            Some("response.completed"),
            json!({"type": "response.output_text.delta"}),
        );
        assert_eq!(event.event_type, StreamEventType::Completed);
        assert!(event.is_final());
    }

    #[test]
    fn empty_text_delta_is_distinct_from_absent() {
        let event = classify(
            Some("response.output_text.delta"),
            json!({"delta": {"text": ""}}),
        );
        assert_eq!(event.text_delta.as_deref(), Some(""));

        let event = classify(Some("response.created"), json!({"response": {"id": "r"}}));
        assert!(event.text_delta.is_none());
    }

    #[test]
    fn delta_field_priority_order() {
        let event = classify(
            Some("response.output_text.delta"),
            json!({"delta": {"content": "from-content", "output_text": "from-output"}}),
        );
        assert_eq!(event.text_delta.as_deref(), Some("from-content"));

        let event = classify(
            Some("response.output_text.delta"),
            json!({"delta": ["a", {"text": "b"}, {"other": 1}]}),
        );
        assert_eq!(event.text_delta.as_deref(), Some("ab"));
    }

    #[test]
    fn reasoning_string_delta_is_not_a_text_delta() {
        let event = classify(Some("response.reasoning_text.delta"), json!({"delta": "hm"}));
        assert_eq!(event.reasoning_delta.as_deref(), Some("hm"));
        assert!(event.text_delta.is_none());
        assert_eq!(event.activity, StreamActivity::Thinking);
        assert!(event.is_thinking());
    }

    #[test]
    fn streamed_arguments_carry_identity_for_accumulation() {
        let event = classify(
            Some("response.function_call_arguments.delta"),
            json!({"item_id": "fc_1", "output_index": 2, "delta": "{\"ci"}),
        );
        let call = event.tool_call.unwrap();
        assert_eq!(call.id, "fc_1");
        assert_eq!(call.output_index, Some(2));
        assert_eq!(call.arguments_json.as_deref(), Some("{\"ci"));
        assert_eq!(event.activity, StreamActivity::ToolUse);
    }

    #[test]
    fn text_delta_with_item_id_is_not_a_tool_fragment() {
        let event = classify(
            Some("response.output_text.delta"),
            json!({"item_id": "msg_1", "delta": "hi "}),
        );
        assert!(event.tool_call.is_none());
        assert_eq!(event.text_delta.as_deref(), Some("hi "));
        assert_eq!(event.activity, StreamActivity::StreamingText);
    }

    #[test]
    fn web_search_lifecycle_frames_classify_as_web_search() {
        let event = classify(
            Some("response.web_search_call.searching"),
            json!({"item_id": "ws_1", "output_index": 0}),
        );
        assert_eq!(event.event_type, StreamEventType::ToolCallDelta);
        assert_eq!(event.activity, StreamActivity::WebSearch);
        assert!(event.is_web_search());
    }

    #[test]
    fn unknown_event_names_pass_through() {
        let event = classify(Some("response.future_feature.delta"), json!({}));
        assert_eq!(event.event_type, StreamEventType::Unknown);
        assert_eq!(event.raw_event_name, "response.future_feature.delta");
    }

    #[test]
    fn classification_is_idempotent() {
        let payload = json!({"type": "response.output_text.delta", "delta": "x"});
        let a = classify(None, payload.clone());
        let b = classify(None, payload);
        assert_eq!(a.event_type, b.event_type);
        assert_eq!(a.activity, b.activity);
        assert_eq!(a.text_delta, b.text_delta);
    }

    #[test]
    fn default_sse_event_name_is_treated_as_absent() {
        assert!(resolve_event_name("message").is_none());
        assert!(resolve_event_name("").is_none());
        assert_eq!(
            resolve_event_name("response.created"),
            Some("response.created")
        );
    }
}
