//! Tool declarations, tool-choice policy, and normalized tool calls

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LlmError;

/// How the model may select among declared tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides whether to call a tool
    Auto,
    /// Model must not call any tool
    None,
    /// Model must call the named function
    Function(String),
}

/// A tool declared on a request
///
/// `parameters` is an open map serialized verbatim alongside the type tag,
/// so experimental vendor fields pass through untouched. Function tools
/// always carry `name` and, once built, an inlined JSON Schema under
/// `parameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Vendor tool type, e.g. `function`, `web_search`, `file_search`
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Open parameter map serialized next to the type tag
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl ToolSpec {
    /// Start building a function tool
    pub fn function(name: impl Into<String>) -> ToolSpecBuilder {
        let mut parameters = Map::new();
        parameters.insert("name".to_owned(), Value::String(name.into()));
        ToolSpecBuilder {
            tool_type: "function".to_owned(),
            parameters,
        }
    }

    /// Start building a custom tool type
    pub fn custom(tool_type: impl Into<String>) -> ToolSpecBuilder {
        ToolSpecBuilder {
            tool_type: tool_type.into(),
            parameters: Map::new(),
        }
    }

    /// Wire form: `{"type": ..., ...parameters}`
    pub fn to_wire(&self) -> Value {
        let mut obj = self.parameters.clone();
        obj.insert("type".to_owned(), Value::String(self.tool_type.clone()));
        Value::Object(obj)
    }
}

/// Fluent builder for [`ToolSpec`]
#[derive(Debug, Clone)]
pub struct ToolSpecBuilder {
    tool_type: String,
    parameters: Map<String, Value>,
}

impl ToolSpecBuilder {
    /// Human-readable description shown to the model
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.parameters
            .insert("description".to_owned(), Value::String(description.into()));
        self
    }

    /// Attach an arbitrary property (useful for experimental vendor fields)
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Generate the argument schema from a type
    pub fn parameters_for<T: schemars::JsonSchema>(self) -> Result<Self, LlmError> {
        let schema = instruct_schema::generate::<T>()?;
        Ok(self.parameters_schema(schema))
    }

    /// Supply a pre-built argument schema
    #[must_use]
    pub fn parameters_schema(mut self, schema: Value) -> Self {
        self.parameters.insert("parameters".to_owned(), schema);
        self
    }

    /// Finish building
    pub fn build(self) -> ToolSpec {
        ToolSpec {
            tool_type: self.tool_type,
            parameters: self.parameters,
        }
    }
}

/// A normalized model-initiated tool invocation
///
/// Built atomically from a completed response, or incrementally from
/// streamed fragments correlated by [`ToolCall::correlation_id`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider item identifier (may vary per stream chunk)
    #[serde(default)]
    pub id: String,
    /// Stable cross-frame correlation key, when the provider sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Tool type; bare function-argument fragments default to `function`
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw JSON text of the call arguments, possibly accumulated from deltas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments_json: Option<String>,
    /// Execution result echoed back by the provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Provider-reported status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Position in the provider's output list, used to correlate fragments
    /// that carry no id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_index: Option<u32>,
}

impl ToolCall {
    /// Key under which captured tool calls are stored in
    /// [`LlmResponse::additional_data`](crate::types::LlmResponse)
    pub const ADDITIONAL_DATA_KEY: &'static str = "tool_calls";

    /// Normalize a provider-specific tool-call-ish JSON fragment
    ///
    /// Accepts the chat-completions `{id, type, function: {name, arguments}}`
    /// shape, the Responses API `{id, call_id, name, arguments}` items, and
    /// bare argument fragments. Returns `None` when the value carries no
    /// identifying information at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let function = obj.get("function").and_then(Value::as_object);

        let id = string_field(obj, "id")
            .or_else(|| string_field(obj, "item_id"))
            .unwrap_or_default();
        let call_id = string_field(obj, "call_id");
        let tool_type =
            string_field(obj, "type").unwrap_or_else(|| "function".to_owned());
        let name = string_field(obj, "name")
            .or_else(|| function.and_then(|f| string_field(f, "name")));
        let arguments_json = obj
            .get("arguments")
            .and_then(json_text)
            .or_else(|| function.and_then(|f| f.get("arguments")).and_then(json_text))
            .or_else(|| obj.get("input").and_then(json_text));
        let output = obj.get("output").and_then(json_text);
        let status = string_field(obj, "status");
        let output_index = obj
            .get("output_index")
            .or_else(|| obj.get("index"))
            .and_then(Value::as_u64)
            .and_then(|i| u32::try_from(i).ok());

        if id.is_empty() && call_id.is_none() && name.is_none() && arguments_json.is_none() {
            return None;
        }

        Some(Self {
            id,
            call_id,
            tool_type,
            name,
            arguments_json,
            output,
            status,
            output_index,
        })
    }

    /// Stable identity for concatenating streamed fragments
    ///
    /// Prefers `call_id`: some providers keep it constant across frames
    /// while `id` varies per chunk.
    pub fn correlation_id(&self) -> &str {
        self.call_id.as_deref().unwrap_or(&self.id)
    }

    /// Whether any argument text has been collected
    pub fn has_arguments(&self) -> bool {
        self.arguments_json
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty())
    }

    /// Decode the accumulated arguments into a typed value
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, LlmError> {
        let raw = self.arguments_json.as_deref().unwrap_or_default();
        serde_json::from_str(raw).map_err(|e| {
            LlmError::StructuredOutput(format!(
                "tool call arguments did not match the requested type: {e}"
            ))
        })
    }
}

/// Read a string field from a JSON object
fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Render a field that may be either raw JSON text or a JSON value
fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => serde_json::to_string(other).ok(),
    }
}

/// Accumulates streamed tool-call fragments into whole calls
///
/// Fragments are merged by correlation id when present, by output index
/// otherwise, falling back to the most recent call for bare argument
/// deltas. Argument text concatenates in arrival order.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<ToolCall>,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the tool-call fragment of a stream event, if it carries one
    pub fn observe(&mut self, event: &super::stream::StreamEvent) {
        if let Some(fragment) = &event.tool_call {
            self.push(fragment);
        }
    }

    /// Merge one fragment
    pub fn push(&mut self, fragment: &ToolCall) {
        let key = fragment.correlation_id();
        let slot = if key.is_empty() {
            if let Some(index) = fragment.output_index {
                self.calls
                    .iter_mut()
                    .find(|c| c.output_index == Some(index))
            } else {
                self.calls.last_mut()
            }
        } else {
            self.calls.iter_mut().find(|c| c.correlation_id() == key)
        };

        match slot {
            Some(existing) => merge(existing, fragment),
            None => self.calls.push(fragment.clone()),
        }
    }

    /// Finish, returning calls in first-seen order
    pub fn into_calls(self) -> Vec<ToolCall> {
        self.calls
    }
}

/// Fold a later fragment into an existing call
fn merge(existing: &mut ToolCall, fragment: &ToolCall) {
    if existing.id.is_empty() {
        existing.id.clone_from(&fragment.id);
    }
    if existing.call_id.is_none() {
        existing.call_id.clone_from(&fragment.call_id);
    }
    if fragment.tool_type != "function" {
        existing.tool_type.clone_from(&fragment.tool_type);
    }
    if existing.name.is_none() {
        existing.name.clone_from(&fragment.name);
    }
    if let Some(args) = &fragment.arguments_json {
        match &mut existing.arguments_json {
            Some(acc) => acc.push_str(args),
            None => existing.arguments_json = Some(args.clone()),
        }
    }
    if fragment.output.is_some() {
        existing.output.clone_from(&fragment.output);
    }
    if fragment.status.is_some() {
        existing.status.clone_from(&fragment.status);
    }
    if existing.output_index.is_none() {
        existing.output_index = fragment.output_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fragment_without_type_defaults_to_function() {
        let call = ToolCall::from_value(&json!({
            "item_id": "fc_1",
            "arguments": "{\"city\":"
        }))
        .unwrap();
        assert_eq!(call.tool_type, "function");
        assert_eq!(call.id, "fc_1");
    }

    #[test]
    fn call_id_wins_as_correlation_key() {
        let call = ToolCall::from_value(&json!({
            "id": "item_abc",
            "call_id": "call_xyz",
            "type": "function",
            "name": "lookup"
        }))
        .unwrap();
        assert_eq!(call.correlation_id(), "call_xyz");
    }

    #[test]
    fn chat_completions_shape_is_recognized() {
        let call = ToolCall::from_value(&json!({
            "id": "call_1",
            "type": "function",
            "function": {"name": "get_weather", "arguments": "{\"city\":\"Oslo\"}"}
        }))
        .unwrap();
        assert_eq!(call.name.as_deref(), Some("get_weather"));
        assert_eq!(call.arguments_json.as_deref(), Some("{\"city\":\"Oslo\"}"));
    }

    #[test]
    fn value_arguments_are_rendered_as_json_text() {
        let call = ToolCall::from_value(&json!({
            "id": "tu_1",
            "name": "responseSchema",
            "input": {"a": 1}
        }))
        .unwrap();
        assert_eq!(call.arguments_json.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn unidentifiable_fragment_is_rejected() {
        assert!(ToolCall::from_value(&json!({"sequence_number": 7})).is_none());
        assert!(ToolCall::from_value(&json!("not an object")).is_none());
    }

    #[test]
    fn accumulator_concatenates_argument_deltas() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(
            &ToolCall::from_value(&json!({
                "item_id": "fc_1",
                "name": "get_weather",
                "arguments": "{\"city\""
            }))
            .unwrap(),
        );
        acc.push(
            &ToolCall::from_value(&json!({
                "item_id": "fc_1",
                "arguments": ":\"Oslo\"}"
            }))
            .unwrap(),
        );

        let calls = acc.into_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].arguments_json.as_deref(),
            Some("{\"city\":\"Oslo\"}")
        );
        assert_eq!(calls[0].name.as_deref(), Some("get_weather"));
    }

    #[test]
    fn bare_delta_attaches_to_most_recent_call() {
        let mut acc = ToolCallAccumulator::new();
        acc.push(
            &ToolCall::from_value(&json!({"id": "fc_1", "name": "f", "arguments": "{"}))
                .unwrap(),
        );
        let bare = ToolCall {
            arguments_json: Some("}".to_owned()),
            tool_type: "function".to_owned(),
            ..ToolCall::default()
        };
        acc.push(&bare);

        let calls = acc.into_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments_json.as_deref(), Some("{}"));
    }

    #[test]
    fn tool_spec_builder_wire_shape() {
        let spec = ToolSpec::function("get_weather")
            .description("Look up current weather")
            .parameters_schema(json!({"type": "object"}))
            .build();
        let wire = spec.to_wire();
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["name"], "get_weather");
        assert_eq!(wire["parameters"]["type"], "object");
    }
}
