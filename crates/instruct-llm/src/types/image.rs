use serde::{Deserialize, Serialize};

/// Requested fidelity for image analysis
///
/// Mapped to each provider's own vocabulary at encode time; providers that
/// lack a medium level collapse it to high.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDetail {
    Auto,
    #[default]
    Low,
    Medium,
    High,
}

/// A single image attached to a request
///
/// The URI is either an HTTP(S) URL or a `data:` URI with a base64 payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    /// HTTP URL or `data:image/...;base64,...` URI
    pub url: String,
    /// Requested analysis fidelity
    #[serde(default)]
    pub detail: ImageDetail,
}

impl ImageRef {
    /// Create an image reference with the default detail level
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detail: ImageDetail::default(),
        }
    }

    /// Set the requested detail level
    #[must_use]
    pub const fn with_detail(mut self, detail: ImageDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Whether this is an inline base64 data URI
    pub fn is_base64(&self) -> bool {
        self.url.starts_with("data:image/") && self.url.contains(";base64,")
    }

    /// Image MIME subtype: from the data URI media type for base64 images,
    /// from the filename extension otherwise; defaults to `png`
    pub fn mime_subtype(&self) -> &str {
        if self.is_base64() {
            self.url
                .trim_start_matches("data:image/")
                .split(';')
                .next()
                .unwrap_or("png")
        } else {
            match self.url.rsplit_once('.') {
                Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
                _ => "png",
            }
        }
    }

    /// Base64 payload with the `data:` prefix stripped, for providers that
    /// take media type and data as separate fields
    pub fn base64_payload(&self) -> Option<&str> {
        self.url.split_once(";base64,").map(|(_, data)| data)
    }
}
