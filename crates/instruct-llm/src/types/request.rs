//! The provider-agnostic request shape

use serde::{Deserialize, Serialize};

use super::image::ImageRef;
use super::tool::{ToolChoice, ToolSpec};

/// A provider-agnostic query
///
/// Transcoders encode this into each vendor's wire body. An empty `images`
/// list selects the plain envelope; a non-empty list selects the multimodal
/// envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Model identifier, passed through verbatim
    pub model: String,
    /// System-level instructions
    #[serde(default)]
    pub instructions: String,
    /// User input text
    #[serde(default)]
    pub input: String,
    /// Sampling temperature; omitted from the wire body when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Attached images; non-empty switches to the multimodal envelope
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    /// Caller-declared tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    /// Tool selection policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Reasoning controls for models that expose them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningOptions>,
    /// `Some` enables the provider's built-in web search tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<WebSearchOptions>,
    /// Enable the provider's built-in file search tool
    #[serde(default)]
    pub file_search: bool,
    /// Enable the provider's built-in image generation tool
    #[serde(default)]
    pub image_generation: bool,
    /// Enable the provider's built-in code interpreter tool
    #[serde(default)]
    pub code_interpreter: bool,
    /// Enable the provider's built-in computer use tool
    #[serde(default)]
    pub computer_use: bool,
}

impl QueryRequest {
    /// Create a request with the given model, instructions, and input
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: input.into(),
            ..Self::default()
        }
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Attach an image
    #[must_use]
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.images.push(image);
        self
    }

    /// Declare a tool
    #[must_use]
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the tool selection policy
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Enable web search with the given options
    #[must_use]
    pub fn with_web_search(mut self, options: WebSearchOptions) -> Self {
        self.web_search = Some(options);
        self
    }

    /// Set reasoning options
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: ReasoningOptions) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    /// Whether this request takes the multimodal encode path
    pub fn contains_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Reasoning effort requested from reasoning-capable models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    /// Wire form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Reasoning summary verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummary {
    Auto,
    Concise,
    Detailed,
}

impl ReasoningSummary {
    /// Wire form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }
}

/// Reasoning controls, passed through to providers that accept them
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReasoningOptions {
    pub effort: ReasoningEffort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummary>,
}

impl ReasoningOptions {
    /// Reasoning at the given effort, no summary
    pub const fn effort(effort: ReasoningEffort) -> Self {
        Self {
            effort,
            summary: None,
        }
    }

    /// Set the summary verbosity
    #[must_use]
    pub const fn with_summary(mut self, summary: ReasoningSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// How much page context the built-in web search tool retrieves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    #[default]
    Medium,
    High,
}

impl SearchContextSize {
    /// Wire form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Options for the provider's built-in web search tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSearchOptions {
    /// Retrieved page context budget
    #[serde(default)]
    pub context_size: SearchContextSize,
    /// ISO country code used to localize results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_country: Option<String>,
}

impl WebSearchOptions {
    /// Web search with default context and no location hint
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retrieved context budget
    #[must_use]
    pub const fn with_context_size(mut self, size: SearchContextSize) -> Self {
        self.context_size = size;
        self
    }

    /// Localize results to an ISO country code
    #[must_use]
    pub fn with_user_country(mut self, country: impl Into<String>) -> Self {
        self.user_country = Some(country.into());
        self
    }
}
