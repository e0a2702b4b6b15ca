//! DeepSeek adapter.
//!
//! Speaks the OpenAI chat completions dialect with bearer auth. Text only:
//! the adapter has no [`VisionInput`](super::VisionInput) and never looks
//! at request images.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::openai::{ChatCompletionRequest, ChatMessage, MessageContent, complete};
use super::{
    Endpoint, MAX_OUTPUT_TOKENS, ProviderSettings, SummaryProvider, TEMPERATURE, prompt,
};
use crate::auth::ApiKey;
use crate::failure::ProviderFailure;
use crate::http::HttpTransport;
use crate::types::SummaryRequest;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// DeepSeek adapter.
pub struct DeepSeekProvider {
    endpoint: Endpoint,
    transport: Arc<dyn HttpTransport>,
}

impl DeepSeekProvider {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: Endpoint::new(DEFAULT_BASE_URL, DEFAULT_MODEL),
            transport,
        }
    }

    /// Apply configured overrides.
    pub fn with_settings(mut self, settings: &ProviderSettings) -> Self {
        self.endpoint = self.endpoint.with_settings(settings);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn build_request_body(&self, request: &SummaryRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.endpoint.model().to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(prompt::system_instruction(false)),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(prompt::user_prompt(request, &[])),
                },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl SummaryProvider for DeepSeekProvider {
    fn id(&self) -> &'static str {
        "deepseek"
    }

    fn name(&self) -> &'static str {
        "DeepSeek"
    }

    async fn generate_summary(
        &self,
        api_key: &ApiKey,
        request: &SummaryRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderFailure> {
        let body = self.build_request_body(request);
        let url = self.endpoint.url("/chat/completions");
        debug!(model = %self.endpoint.model(), "sending DeepSeek chat completion");
        complete(self.transport.as_ref(), url, api_key, &body, cancel).await
    }
}
