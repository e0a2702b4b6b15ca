//! Mapping from raw failure evidence to the canonical error taxonomy.
//!
//! Rules, first match wins:
//!
//! | Evidence                    | Kind            |
//! |-----------------------------|-----------------|
//! | cancellation fired          | `TIMEOUT`       |
//! | transport failure           | `NETWORK_ERROR` |
//! | HTTP 400 / 401 / 403        | `UNAUTHORIZED`  |
//! | HTTP 429                    | `RATE_LIMIT`    |
//! | HTTP 404                    | `UNKNOWN` (model not found) |
//! | HTTP >= 500                 | `SERVER_ERROR`  |
//! | anything else               | `UNKNOWN`       |
//!
//! The function only accepts [`ProviderFailure`], so an error that already
//! carries a kind cannot be fed back in.

use crate::failure::{CanonicalError, ErrorKind, HttpFailure, ProviderFailure};

/// User message for a 404 from the provider.
pub const MODEL_NOT_FOUND_MESSAGE: &str =
    "The selected model was not found. It may not be available for your API key.";

/// Classify one failure. Pure: equal input always yields an equal output.
pub fn classify(failure: &ProviderFailure) -> CanonicalError {
    match failure {
        ProviderFailure::Cancelled => CanonicalError::from_kind(
            ErrorKind::Timeout,
            "request aborted by dispatch timeout",
        ),
        ProviderFailure::Transport(detail) => {
            CanonicalError::from_kind(ErrorKind::NetworkError, format!("transport failure: {detail}"))
        }
        ProviderFailure::Http(http) => classify_status(http),
        ProviderFailure::Malformed(_)
        | ProviderFailure::InvalidRequest(_)
        | ProviderFailure::BodyTooLarge { .. } => {
            CanonicalError::from_kind(ErrorKind::Unknown, failure.to_string())
        }
    }
}

fn classify_status(http: &HttpFailure) -> CanonicalError {
    let debug_info = http.to_string();
    match http.status {
        400 | 401 | 403 => CanonicalError::from_kind(ErrorKind::Unauthorized, debug_info),
        429 => CanonicalError::from_kind(ErrorKind::RateLimit, debug_info),
        404 => CanonicalError::new(ErrorKind::Unknown, MODEL_NOT_FOUND_MESSAGE, debug_info),
        status if status >= 500 => CanonicalError::from_kind(ErrorKind::ServerError, debug_info),
        _ => CanonicalError::new(
            ErrorKind::Unknown,
            unknown_message(http.message.as_deref()),
            debug_info,
        ),
    }
}

/// Generic message, with the provider's wording appended as a hint.
fn unknown_message(provider_message: Option<&str>) -> String {
    match provider_message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(hint) => format!("{} ({hint})", ErrorKind::Unknown.user_message()),
        None => ErrorKind::Unknown.user_message().to_string(),
    }
}
