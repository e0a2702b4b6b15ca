//! Provider adapters.
//!
//! Each adapter implements [`SummaryProvider`]: it turns a
//! [`SummaryRequest`] into one service's wire format, performs the call
//! through an [`HttpTransport`](crate::http::HttpTransport), and returns
//! either the summary text or raw [`ProviderFailure`] evidence. Adapters
//! never classify failures themselves.
//!
//! Adapters that accept images also implement [`VisionInput`] and expose it
//! through [`SummaryProvider::vision`]. The registry reads that once, at
//! registration time.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pagebrief_models::http::ReqwestTransport;
//! use pagebrief_models::providers::{OpenAiProvider, SummaryProvider};
//!
//! let provider = OpenAiProvider::new(Arc::new(ReqwestTransport::new()));
//! let summary = provider.generate_summary(&key, &request, &cancel).await?;
//! ```

mod deepseek;
mod gemini;
mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use crate::auth::ApiKey;
use crate::failure::ProviderFailure;
use crate::types::{AttachmentMode, SummaryRequest};

/// Sampling temperature shared by all adapters.
pub(crate) const TEMPERATURE: f32 = 0.3;

/// Output token cap shared by all adapters.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 1024;

/// A remote summarization service.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Identifier used for dispatch and key lookup (e.g. `"openai"`).
    fn id(&self) -> &'static str;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;

    /// Image support, if this provider has any.
    fn vision(&self) -> Option<&dyn VisionInput> {
        None
    }

    /// Generate a summary for `request`.
    ///
    /// Images on the request are ignored unless [`vision`](Self::vision)
    /// returns `Some`.
    ///
    /// # Errors
    ///
    /// - [`ProviderFailure::Http`] for non-success statuses and for
    ///   envelopes missing the summary text
    /// - [`ProviderFailure::Transport`] / [`ProviderFailure::Cancelled`]
    ///   passed through from the transport
    async fn generate_summary(
        &self,
        api_key: &ApiKey,
        request: &SummaryRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderFailure>;
}

/// Capability marker for providers that accept image inputs.
pub trait VisionInput: Send + Sync {
    /// How images are embedded in the outbound request.
    fn attachment_mode(&self) -> AttachmentMode;
}

/// Per-provider overrides read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Model name sent to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API base URL, without a trailing slash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Base URL and model an adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    model: String,
}

impl Endpoint {
    pub(crate) fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
        }
    }

    /// Apply configured overrides; unset fields keep their defaults.
    pub fn with_settings(mut self, settings: &ProviderSettings) -> Self {
        if let Some(url) = &settings.base_url {
            self.base_url = normalize_base_url(url);
        }
        if let Some(model) = &settings.model {
            self.model = model.clone();
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `path` appended to the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Strip trailing slashes so endpoint paths can be appended verbatim.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryType;

    /// Text-only provider returning a fixed summary.
    struct EchoProvider;

    #[async_trait]
    impl SummaryProvider for EchoProvider {
        fn id(&self) -> &'static str {
            "echo"
        }

        fn name(&self) -> &'static str {
            "Echo"
        }

        async fn generate_summary(
            &self,
            _api_key: &ApiKey,
            request: &SummaryRequest,
            _cancel: &CancellationToken,
        ) -> Result<String, ProviderFailure> {
            Ok(format!("{} summary", request.summary_type()))
        }
    }

    #[test]
    fn default_vision_is_none() {
        assert!(EchoProvider.vision().is_none());
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Box<dyn SummaryProvider> = Box::new(EchoProvider);
        let request = SummaryRequest::new("a".repeat(120), SummaryType::Detailed).unwrap();
        let summary = provider
            .generate_summary(&ApiKey::new("k"), &request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary, "detailed summary");
    }

    #[test]
    fn settings_parse_partial_toml_shape() {
        let settings: ProviderSettings =
            serde_json::from_str(r#"{"model": "gpt-4o"}"#).unwrap();
        assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
        assert!(settings.base_url.is_none());
    }

    #[test]
    fn endpoint_settings_override_only_given_fields() {
        let endpoint = Endpoint::new("https://api.test/v1", "small").with_settings(
            &ProviderSettings {
                model: None,
                base_url: Some("http://localhost:8080/v1/".into()),
            },
        );
        assert_eq!(endpoint.base_url(), "http://localhost:8080/v1");
        assert_eq!(endpoint.model(), "small");
        assert_eq!(
            endpoint.url("/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn normalize_base_url_strips_trailing_slashes() {
        assert_eq!(normalize_base_url("http://x.test/v1//"), "http://x.test/v1");
        assert_eq!(normalize_base_url("http://x.test"), "http://x.test");
    }
}
