//! Normalized streaming events

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::ToolCall;

/// Uniform classification of a vendor stream event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
pub enum StreamEventType {
    Created,
    InProgress,
    OutputItemAdded,
    OutputItemDone,
    ContentPartAdded,
    ContentPartDone,
    OutputTextDelta,
    OutputTextDone,
    ReasoningDelta,
    ReasoningDone,
    ToolCallDelta,
    ToolCallDone,
    Completed,
    Incomplete,
    Error,
    RefusalDelta,
    RefusalDone,
    /// `choices[0].delta` chat-completions frame with no event name
    LegacyChatCompletionsDelta,
    Unknown,
}

impl StreamEventType {
    /// Map a resolved vendor event name onto the uniform taxonomy
    ///
    /// Unrecognized names map to [`Unknown`](Self::Unknown) rather than
    /// failing, so new vendor event types pass through.
    pub fn from_name(name: &str) -> Self {
        match name {
            "response.created" => Self::Created,
            "response.in_progress" => Self::InProgress,
            "response.output_item.added" => Self::OutputItemAdded,
            "response.output_item.done" => Self::OutputItemDone,
            "response.content_part.added" => Self::ContentPartAdded,
            "response.content_part.done" => Self::ContentPartDone,
            "response.output_text.delta" => Self::OutputTextDelta,
            "response.output_text.done" => Self::OutputTextDone,
            "response.reasoning.delta"
            | "response.reasoning_text.delta"
            | "response.reasoning_summary_text.delta" => Self::ReasoningDelta,
            "response.reasoning.done"
            | "response.reasoning_text.done"
            | "response.reasoning_summary_text.done" => Self::ReasoningDone,
            "response.function_call_arguments.delta"
            | "response.web_search_call.in_progress"
            | "response.web_search_call.searching" => Self::ToolCallDelta,
            "response.function_call_arguments.done"
            | "response.web_search_call.completed" => Self::ToolCallDone,
            "response.completed" => Self::Completed,
            "response.incomplete" => Self::Incomplete,
            "response.failed" | "error" => Self::Error,
            "response.refusal.delta" => Self::RefusalDelta,
            "response.refusal.done" => Self::RefusalDone,
            _ => Self::Unknown,
        }
    }

    /// Whether this event type can carry a tool-call fragment
    pub const fn is_tool_related(self) -> bool {
        matches!(
            self,
            Self::ToolCallDelta | Self::ToolCallDone | Self::OutputItemAdded | Self::OutputItemDone
        )
    }
}

/// Coarse activity classification for status display
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
pub enum StreamActivity {
    Unknown,
    Initializing,
    Thinking,
    StreamingText,
    ToolUse,
    WebSearch,
    Completed,
    Error,
}

impl StreamActivity {
    /// Derive the activity from an event type and the tool type string,
    /// when one was extracted
    ///
    /// Pure: the same inputs always classify the same way. A tool type of
    /// `web_search` (any case) distinguishes [`WebSearch`](Self::WebSearch)
    /// from generic [`ToolUse`](Self::ToolUse).
    pub fn derive(event_type: StreamEventType, tool_type: Option<&str>) -> Self {
        use StreamEventType as E;
        match event_type {
            E::Created | E::InProgress => Self::Initializing,
            E::ReasoningDelta | E::ReasoningDone => Self::Thinking,
            E::OutputTextDelta
            | E::OutputTextDone
            | E::ContentPartAdded
            | E::ContentPartDone
            | E::LegacyChatCompletionsDelta => Self::StreamingText,
            E::ToolCallDelta | E::ToolCallDone => Self::from_tool_type(tool_type),
            E::OutputItemAdded | E::OutputItemDone => match tool_type {
                Some(_) => Self::from_tool_type(tool_type),
                None => Self::StreamingText,
            },
            E::Completed | E::Incomplete => Self::Completed,
            E::Error | E::RefusalDelta | E::RefusalDone => Self::Error,
            E::Unknown => Self::Unknown,
        }
    }

    fn from_tool_type(tool_type: Option<&str>) -> Self {
        match tool_type {
            Some(t) if t.eq_ignore_ascii_case("web_search") => Self::WebSearch,
            _ => Self::ToolUse,
        }
    }
}

/// One normalized event from a provider stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// The vendor's literal event tag, or the payload's `type` field when
    /// no `event:` line was present
    pub raw_event_name: String,
    /// Uniform event classification
    pub event_type: StreamEventType,
    /// Coarse activity classification, derived from the event type
    pub activity: StreamActivity,
    /// Incremental output text carried by this frame; `None` when the frame
    /// carried no text delta at all, distinct from an empty delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_delta: Option<String>,
    /// Incremental reasoning text carried by this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_delta: Option<String>,
    /// Tool-call fragment carried by this frame; fragments, not wholes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    /// Provider-reported status, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Raw payload echo for debugging and forward compatibility
    pub payload: Value,
}

impl StreamEvent {
    /// Whether the model is setting up or reasoning, not yet producing text
    pub const fn is_thinking(&self) -> bool {
        matches!(
            self.activity,
            StreamActivity::Initializing | StreamActivity::Thinking
        )
    }

    /// Whether this frame belongs to a web search invocation
    pub const fn is_web_search(&self) -> bool {
        matches!(self.activity, StreamActivity::WebSearch)
    }

    /// Whether the stream has reached a terminal state
    pub const fn is_final(&self) -> bool {
        matches!(
            self.activity,
            StreamActivity::Completed | StreamActivity::Error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_names_do_not_fail() {
        assert_eq!(
            StreamEventType::from_name("response.shiny_new_thing.delta"),
            StreamEventType::Unknown
        );
    }

    #[test]
    fn web_search_tool_type_classifies_as_web_search() {
        for tool_type in ["web_search", "WEB_SEARCH", "Web_Search"] {
            assert_eq!(
                StreamActivity::derive(StreamEventType::ToolCallDelta, Some(tool_type)),
                StreamActivity::WebSearch
            );
        }
        assert_eq!(
            StreamActivity::derive(StreamEventType::ToolCallDelta, Some("function")),
            StreamActivity::ToolUse
        );
        assert_eq!(
            StreamActivity::derive(StreamEventType::ToolCallDelta, None),
            StreamActivity::ToolUse
        );
    }

    #[test]
    fn activity_is_deterministic_per_event_type() {
        assert_eq!(
            StreamActivity::derive(StreamEventType::Created, None),
            StreamActivity::Initializing
        );
        assert_eq!(
            StreamActivity::derive(StreamEventType::ReasoningDelta, None),
            StreamActivity::Thinking
        );
        assert_eq!(
            StreamActivity::derive(StreamEventType::Incomplete, None),
            StreamActivity::Completed
        );
        assert_eq!(
            StreamActivity::derive(StreamEventType::RefusalDelta, None),
            StreamActivity::Error
        );
    }
}
