//! Error types for credential handling and crate-level plumbing.
//!
//! Dispatch outcomes use [`CanonicalError`](crate::CanonicalError) instead;
//! this type covers everything that happens outside a summarization call.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of a dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials not found for provider.
    #[error("credentials not found for provider: {0}")]
    CredentialsNotFound(String),

    /// Failed to access system keyring.
    #[error("keyring error: {0}")]
    Keyring(String),

    /// API key was empty after trimming.
    #[error("API key must not be empty")]
    EmptyApiKey,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
