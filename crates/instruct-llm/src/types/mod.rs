//! Provider-agnostic request, response, and stream event types

pub mod image;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use image::{ImageDetail, ImageRef};
pub use request::{
    QueryRequest, ReasoningEffort, ReasoningOptions, ReasoningSummary, SearchContextSize,
    WebSearchOptions,
};
pub use response::{LlmResponse, Usage};
pub use stream::{StreamActivity, StreamEvent, StreamEventType};
pub use tool::{ToolCall, ToolCallAccumulator, ToolChoice, ToolSpec, ToolSpecBuilder};
