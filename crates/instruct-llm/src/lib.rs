//! Uniform client library for LLM provider APIs
//!
//! One request/response contract over OpenAI (Responses API), Anthropic,
//! Google, and OpenAI-compatible chat-completions providers (Grok,
//! DeepSeek, Llama hosts), with structured output via generated JSON
//! Schemas and normalized SSE streaming events.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod config;
pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod stream;
pub mod types;

pub use config::HttpConfig;
pub use convert::{DecodedResponse, OutputFormat, RawOutput};
pub use error::LlmError;
pub use provider::{
    AnthropicClient, ChatCompatClient, GoogleClient, OpenAiClient, Provider, ProviderCapabilities,
    ProviderExt, ProviderKind,
};
pub use stream::EventStream;
pub use types::{
    ImageDetail, ImageRef, LlmResponse, QueryRequest, StreamActivity, StreamEvent, StreamEventType,
    ToolCall, ToolCallAccumulator, ToolChoice, ToolSpec, Usage,
};
