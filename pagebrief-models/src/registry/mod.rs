//! Provider registry.
//!
//! Static lookup from provider id to adapter. Capabilities are read from
//! each adapter once, when it is registered, and never change afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::http::HttpTransport;
use crate::providers::{
    DeepSeekProvider, GeminiProvider, OpenAiProvider, ProviderSettings, SummaryProvider,
};
use crate::types::ProviderCapabilities;

/// An adapter together with the capabilities captured at registration.
#[derive(Clone)]
pub struct RegisteredProvider {
    provider: Arc<dyn SummaryProvider>,
    capabilities: ProviderCapabilities,
}

impl RegisteredProvider {
    fn new(provider: Arc<dyn SummaryProvider>) -> Self {
        let attachment = provider.vision().map(|vision| vision.attachment_mode());
        let capabilities = ProviderCapabilities {
            id: provider.id().to_string(),
            name: provider.name().to_string(),
            supports_multimodal: attachment.is_some(),
            attachment,
        };
        Self {
            provider,
            capabilities,
        }
    }

    pub fn provider(&self) -> &Arc<dyn SummaryProvider> {
        &self.provider
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Registry of summary providers, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in adapters (`openai`, `gemini`,
    /// `deepseek`), with per-provider overrides keyed by id.
    pub fn builtin(
        transport: Arc<dyn HttpTransport>,
        settings: &BTreeMap<String, ProviderSettings>,
    ) -> Self {
        let defaults = ProviderSettings::default();
        let settings_for = |id: &str| settings.get(id).unwrap_or(&defaults);

        let mut registry = Self::new();
        registry.register(Arc::new(
            OpenAiProvider::new(transport.clone()).with_settings(settings_for("openai")),
        ));
        registry.register(Arc::new(
            GeminiProvider::new(transport.clone()).with_settings(settings_for("gemini")),
        ));
        registry.register(Arc::new(
            DeepSeekProvider::new(transport).with_settings(settings_for("deepseek")),
        ));
        registry
    }

    /// Register a provider, replacing any earlier one with the same id.
    pub fn register(&mut self, provider: Arc<dyn SummaryProvider>) {
        let entry = RegisteredProvider::new(provider);
        debug!(
            provider = %entry.capabilities.id,
            multimodal = entry.capabilities.supports_multimodal,
            "registered provider"
        );
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.capabilities.id == entry.capabilities.id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up a provider by id.
    pub fn resolve(&self, provider_id: &str) -> Option<&RegisteredProvider> {
        self.entries
            .iter()
            .find(|entry| entry.capabilities.id == provider_id)
    }

    /// Capabilities of every registered provider, in registration order.
    pub fn providers(&self) -> Vec<ProviderCapabilities> {
        self.entries
            .iter()
            .map(|entry| entry.capabilities.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
