use thiserror::Error;

/// Errors that can occur while querying an LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Upstream provider returned a non-success status or the connection failed
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Response body did not match the provider's expected envelope, or
    /// contained no output at all
    #[error("unexpected response envelope: {0}")]
    Envelope(String),

    /// Extracted text was not valid JSON for the requested type
    #[error("structured output mismatch: {0}")]
    StructuredOutput(String),

    /// Error during streaming response
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Operation is not available on this provider or request path;
    /// raised before any network call is made
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Client was constructed with invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Schema generation for the requested result type failed
    #[error("schema generation failed: {0}")]
    Schema(#[from] instruct_schema::SchemaError),
}
