//! Dispatch coordinator.
//!
//! Single entry point from a [`SummaryRequest`] to summary text or a
//! [`CanonicalError`]. The dispatcher resolves the adapter, strips images
//! the adapter cannot use, arms the timeout and classifies any failure
//! exactly once.
//!
//! ```ignore
//! let registry = ProviderRegistry::builtin(transport, &settings);
//! let dispatcher = Dispatcher::new(registry, DispatchConfig::default());
//! let summary = dispatcher.dispatch("gemini", &key, &request).await?;
//! ```

use std::borrow::Cow;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth::ApiKey;
use crate::classify::classify;
use crate::failure::{CanonicalError, ErrorKind, ProviderFailure};
use crate::registry::ProviderRegistry;
use crate::types::{ProviderCapabilities, SummaryRequest};

/// Default dispatch timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a cancelled call may take to unwind before it is abandoned.
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Time allowed for one provider call, image fetches included.
    pub timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DispatchConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Routes summary requests to registered providers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ProviderRegistry,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Capabilities of every registered provider.
    pub fn list_providers(&self) -> Vec<ProviderCapabilities> {
        self.registry.providers()
    }

    /// Generate a summary with the provider registered as `provider_id`.
    ///
    /// # Errors
    ///
    /// Every failure is returned as a [`CanonicalError`]:
    /// - unknown `provider_id` yields `UNKNOWN` without any network call
    /// - an empty `api_key` yields `UNAUTHORIZED` without any network call
    /// - timeout expiry yields `TIMEOUT`
    /// - provider failures are mapped by [`classify`]
    pub async fn dispatch(
        &self,
        provider_id: &str,
        api_key: &ApiKey,
        request: &SummaryRequest,
    ) -> Result<String, CanonicalError> {
        let Some(entry) = self.registry.resolve(provider_id) else {
            warn!(provider = %provider_id, "dispatch to unknown provider");
            return Err(CanonicalError::unknown_provider(provider_id));
        };

        if api_key.is_empty() {
            return Err(CanonicalError::from_kind(
                ErrorKind::Unauthorized,
                format!("no API key configured for provider '{provider_id}'"),
            ));
        }

        let request = if entry.capabilities().supports_multimodal || request.images().is_empty() {
            Cow::Borrowed(request)
        } else {
            debug!(
                provider = %provider_id,
                dropped = request.images().len(),
                "provider is text-only, dropping images"
            );
            Cow::Owned(request.without_images())
        };

        debug!(
            provider = %provider_id,
            summary_type = %request.summary_type(),
            images = request.images().len(),
            timeout_ms = self.config.timeout.as_millis() as u64,
            "dispatching summary request"
        );

        let cancel = CancellationToken::new();
        let call = entry
            .provider()
            .generate_summary(api_key, request.as_ref(), &cancel);
        tokio::pin!(call);

        // The timer lives only inside this block, so it is dropped on every path.
        let outcome = {
            let timer = tokio::time::sleep(self.config.timeout);
            tokio::pin!(timer);

            tokio::select! {
                result = &mut call => result,
                () = &mut timer => {
                    cancel.cancel();
                    match tokio::time::timeout(CANCEL_GRACE, &mut call).await {
                        Ok(Err(failure)) if failure != ProviderFailure::Cancelled => {
                            debug!(
                                provider = %provider_id,
                                error = %failure,
                                "call failed after cancellation"
                            );
                        }
                        Ok(Ok(_)) => {
                            debug!(
                                provider = %provider_id,
                                "discarding summary that arrived after timeout"
                            );
                        }
                        Ok(Err(_)) => {}
                        Err(_) => {
                            warn!(provider = %provider_id, "provider ignored cancellation");
                        }
                    }
                    Err(ProviderFailure::Cancelled)
                }
            }
        };

        match outcome {
            Ok(summary) => {
                debug!(provider = %provider_id, chars = summary.len(), "summary received");
                Ok(summary)
            }
            Err(failure) => {
                let error = classify(&failure);
                warn!(
                    provider = %provider_id,
                    kind = %error.kind,
                    debug_info = %error.debug_info,
                    "summary request failed"
                );
                Err(error)
            }
        }
    }
}
