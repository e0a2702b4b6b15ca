//! Core request and capability types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::failure::CanonicalError;

/// Minimum number of characters of page text accepted for summarization.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Maximum number of images carried by one request.
pub const MAX_IMAGES: usize = 2;

/// Kind of summary requested by the user.
///
/// # Examples
///
/// ```
/// use pagebrief_models::SummaryType;
///
/// let kind: SummaryType = "technical".parse().unwrap();
/// assert_eq!(kind, SummaryType::Technical);
/// assert_eq!(kind.to_string(), "technical");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    #[default]
    Brief,
    Detailed,
    Technical,
}

impl SummaryType {
    /// All summary types, in display order.
    pub const ALL: [SummaryType; 3] = [Self::Brief, Self::Detailed, Self::Technical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::Technical => "technical",
        }
    }

    /// Prompt template sent ahead of the page title and content.
    pub fn prompt_template(self) -> &'static str {
        match self {
            Self::Brief => {
                "Provide a brief summary of the following web page in 2-3 sentences. \
                 Capture the main point and leave out minor details."
            }
            Self::Detailed => {
                "Provide a detailed summary of the following web page. Cover the key points, \
                 supporting arguments and conclusions, using short paragraphs or bullet points."
            }
            Self::Technical => {
                "Provide a technical summary of the following web page. Focus on technical \
                 concepts, implementation details, data and terminology, and keep exact \
                 figures and names intact."
            }
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" => Ok(Self::Brief),
            "detailed" => Ok(Self::Detailed),
            "technical" => Ok(Self::Technical),
            other => Err(format!(
                "unknown summary type '{other}' (expected brief, detailed or technical)"
            )),
        }
    }
}

/// An image found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
        }
    }
}

/// Provider-agnostic summarization request.
///
/// Built once per invocation and never mutated. Construction enforces the
/// minimum content length and caps the image list at [`MAX_IMAGES`].
///
/// # Examples
///
/// ```
/// use pagebrief_models::{ImageRef, SummaryRequest, SummaryType};
///
/// let text = "Rust ownership rules. ".repeat(10);
/// let request = SummaryRequest::new(text, SummaryType::Brief)
///     .unwrap()
///     .with_title("Ownership")
///     .with_images([ImageRef::new("https://example.com/a.png", "diagram")]);
/// assert_eq!(request.images().len(), 1);
///
/// assert!(SummaryRequest::new("too short", SummaryType::Brief).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    content: String,
    summary_type: SummaryType,
    title: String,
    images: Vec<ImageRef>,
}

impl SummaryRequest {
    /// Create a request, rejecting content shorter than [`MIN_CONTENT_CHARS`].
    pub fn new(
        content: impl Into<String>,
        summary_type: SummaryType,
    ) -> Result<Self, CanonicalError> {
        let content = content.into();
        let length = content.trim().chars().count();
        if length < MIN_CONTENT_CHARS {
            return Err(CanonicalError::content_extraction_failed(format!(
                "extracted text has {length} characters, need at least {MIN_CONTENT_CHARS}"
            )));
        }
        Ok(Self {
            content,
            summary_type,
            title: String::new(),
            images: Vec::new(),
        })
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Attach images in extraction order; anything past [`MAX_IMAGES`] is dropped.
    pub fn with_images(mut self, images: impl IntoIterator<Item = ImageRef>) -> Self {
        self.images = images.into_iter().take(MAX_IMAGES).collect();
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn summary_type(&self) -> SummaryType {
        self.summary_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Copy of this request with the image list cleared.
    pub(crate) fn without_images(&self) -> Self {
        Self {
            images: Vec::new(),
            ..self.clone()
        }
    }
}

/// How a multimodal provider embeds images in its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentMode {
    /// The image URL is passed through and fetched by the provider.
    UrlReference,
    /// Image bytes are fetched locally and sent base64-encoded.
    InlineBytes,
}

impl fmt::Display for AttachmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlReference => f.write_str("url"),
            Self::InlineBytes => f.write_str("inline"),
        }
    }
}

/// Static descriptor of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Identifier used for dispatch and key lookup (e.g. `openai`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether image inputs are forwarded to this provider.
    pub supports_multimodal: bool,
    /// Attachment mechanism, present only for multimodal providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentMode>,
}
