//! Failure shapes that cross component boundaries.
//!
//! Adapters and transports produce [`ProviderFailure`] (raw evidence). The
//! dispatcher turns it into exactly one [`CanonicalError`] through
//! [`classify`](crate::classify::classify); nothing downstream ever sees the
//! raw form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed message attached to responses whose envelope lacks the summary text.
pub const INVALID_RESPONSE_STRUCTURE: &str = "invalid response structure";

/// Closed taxonomy of error kinds shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The remote service could not be reached.
    NetworkError,
    /// Bad request or rejected credential.
    Unauthorized,
    /// The provider throttled the request.
    RateLimit,
    /// The provider failed on its side.
    ServerError,
    /// The dispatch timeout fired before the provider answered.
    Timeout,
    /// The provider answered with something unusable.
    InvalidResponse,
    /// The calling layer could not extract enough page content.
    ContentExtractionFailed,
    /// Anything else, including unknown providers and missing models.
    Unknown,
}

impl ErrorKind {
    /// Wire name of the kind (e.g. `RATE_LIMIT`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::RateLimit => "RATE_LIMIT",
            Self::ServerError => "SERVER_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::ContentExtractionFailed => "CONTENT_EXTRACTION_FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Fixed, non-technical message for the kind.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NetworkError => {
                "Unable to reach the AI service. Check your internet connection and try again."
            }
            Self::Unauthorized => {
                "The request was rejected. Check that your API key is valid for this provider."
            }
            Self::RateLimit => "Rate limit exceeded. Please wait a moment and try again.",
            Self::ServerError => {
                "The AI service is experiencing problems. Please try again later."
            }
            Self::Timeout => "The request timed out. Please try again.",
            Self::InvalidResponse => "The AI service returned an unexpected response.",
            Self::ContentExtractionFailed => {
                "Could not extract enough readable content from this page to summarize."
            }
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only structured error shape returned to callers.
///
/// `Display` yields the user message; `debug_info` is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{user_message}")]
pub struct CanonicalError {
    pub kind: ErrorKind,
    pub user_message: String,
    pub debug_info: String,
}

impl CanonicalError {
    /// Create an error with an explicit user message.
    pub fn new(
        kind: ErrorKind,
        user_message: impl Into<String>,
        debug_info: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            user_message: user_message.into(),
            debug_info: debug_info.into(),
        }
    }

    /// Create an error carrying the kind's fixed user message.
    pub fn from_kind(kind: ErrorKind, debug_info: impl Into<String>) -> Self {
        Self::new(kind, kind.user_message(), debug_info)
    }

    /// Error for a provider id missing from the registry.
    pub fn unknown_provider(provider_id: &str) -> Self {
        Self::new(
            ErrorKind::Unknown,
            format!("Unknown AI provider: {provider_id}"),
            format!("no adapter registered for provider id '{provider_id}'"),
        )
    }

    /// Error raised by the calling layer when page content is unusable.
    pub fn content_extraction_failed(debug_info: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::ContentExtractionFailed, debug_info)
    }
}

/// Non-success response from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
pub struct HttpFailure {
    pub status: u16,
    pub message: Option<String>,
}

impl HttpFailure {
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Synthetic 500 for a parsed response missing its text field.
    pub fn invalid_structure() -> Self {
        Self::new(500, Some(INVALID_RESPONSE_STRUCTURE.to_string()))
    }
}

/// Raw failure evidence produced by adapters and transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// The dispatch cancellation signal fired.
    #[error("request cancelled")]
    Cancelled,

    /// The request never reached the server (connect, DNS, TLS, dropped body).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a failure status, or with a body missing the
    /// expected text field.
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// A success response whose body is not valid JSON.
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// The outbound request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body grew past the request's body limit.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}
