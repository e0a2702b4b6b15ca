//! OpenAI chat completions adapter.
//!
//! Bearer-token auth, images passed as `image_url` references. The wire
//! types are shared with the DeepSeek adapter, which speaks the same
//! dialect without image parts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    Endpoint, MAX_OUTPUT_TOKENS, ProviderSettings, SummaryProvider, TEMPERATURE, VisionInput,
    prompt,
};
use crate::auth::ApiKey;
use crate::failure::{HttpFailure, ProviderFailure};
use crate::http::{HttpRequest, HttpTransport};
use crate::types::{AttachmentMode, ImageRef, SummaryRequest};

/// Default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

// ────────────────────────────────────────────────────────────────────────────
// Chat Completions Wire Types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
    pub detail: &'static str,
}

/// Response from `/chat/completions`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text at `choices[0].message.content`.
    pub(crate) fn into_text(self) -> Result<String, ProviderFailure> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| HttpFailure::invalid_structure().into())
    }
}

/// Send a chat completion request and extract the first choice's text.
pub(crate) async fn complete(
    transport: &dyn HttpTransport,
    url: String,
    api_key: &ApiKey,
    body: &ChatCompletionRequest,
    cancel: &CancellationToken,
) -> Result<String, ProviderFailure> {
    let body =
        serde_json::to_value(body).map_err(|e| ProviderFailure::InvalidRequest(e.to_string()))?;
    let request = HttpRequest::post_json(url, body).bearer(api_key.expose_secret());
    transport
        .execute(request, cancel)
        .await?
        .error_for_status()?
        .decode_envelope::<ChatCompletionResponse>()?
        .into_text()
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiProvider
// ────────────────────────────────────────────────────────────────────────────

/// OpenAI adapter.
pub struct OpenAiProvider {
    endpoint: Endpoint,
    transport: Arc<dyn HttpTransport>,
}

impl OpenAiProvider {
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
        // Only absolute web URLs can be fetched by the API.
        let attached: Vec<(&ImageRef, &str)> = request
            .images()
            .iter()
            .filter_map(|image| {
                let url = image.url.trim();
                is_web_url(url).then_some((image, url))
            })
            .collect();
        if attached.len() < request.images().len() {
            debug!(
                dropped = request.images().len() - attached.len(),
                "skipping images without an http(s) URL"
            );
        }

        let captions: Vec<&ImageRef> = attached.iter().map(|(image, _)| *image).collect();
        let text = prompt::user_prompt(request, &captions);
        let user_content = if attached.is_empty() {
            MessageContent::Text(text)
        } else {
            let mut parts = vec![ContentPart::Text { text }];
            parts.extend(attached.iter().map(|(_, url)| ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: (*url).to_string(),
                    detail: "low",
                },
            }));
            MessageContent::Parts(parts)
        };

        ChatCompletionRequest {
            model: self.endpoint.model().to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(prompt::system_instruction(!attached.is_empty())),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

impl VisionInput for OpenAiProvider {
    fn attachment_mode(&self) -> AttachmentMode {
        AttachmentMode::UrlReference
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn id(&self) -> &'static str {
        "openai"
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn vision(&self) -> Option<&dyn VisionInput> {
        Some(self)
    }

    async fn generate_summary(
        &self,
        api_key: &ApiKey,
        request: &SummaryRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderFailure> {
        let body = self.build_request_body(request);
        let url = self.endpoint.url("/chat/completions");
        debug!(model = %self.endpoint.model(), "sending OpenAI chat completion");
        complete(self.transport.as_ref(), url, api_key, &body, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestTransport;
    use crate::types::SummaryType;
    use serde_json::{Value, json};

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(Arc::new(ReqwestTransport::new()))
    }

    fn request() -> SummaryRequest {
        SummaryRequest::new("Borrow checker explained. ".repeat(8), SummaryType::Brief)
            .unwrap()
            .with_title("Borrowing")
    }

    fn body_json(provider: &OpenAiProvider, request: &SummaryRequest) -> Value {
        serde_json::to_value(provider.build_request_body(request)).unwrap()
    }

    #[test]
    fn new_uses_defaults() {
        let provider = provider();
        assert_eq!(provider.endpoint().base_url(), "https://api.openai.com/v1");
        assert_eq!(provider.endpoint().model(), "gpt-4o-mini");
    }

    #[test]
    fn settings_override_model_and_url() {
        let provider = provider().with_settings(&ProviderSettings {
            model: Some("gpt-4o".into()),
            base_url: Some("http://localhost:9999/v1/".into()),
        });
        assert_eq!(provider.endpoint().model(), "gpt-4o");
        assert_eq!(provider.endpoint().base_url(), "http://localhost:9999/v1");
    }

    #[test]
    fn text_only_body_uses_plain_string_content() {
        let body = body_json(&provider(), &request());
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], prompt::SYSTEM_INSTRUCTION);
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Title: Borrowing"));
        assert!(user.contains("Borrow checker explained."));
    }

    #[test]
    fn images_become_url_parts_in_order() {
        let request = request().with_images([
            ImageRef::new("https://img.test/a.png", "first"),
            ImageRef::new("https://img.test/b.png", "second"),
        ]);
        let body = body_json(&provider(), &request);
        let parts = body["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(
            parts[1],
            json!({"type": "image_url", "image_url": {"url": "https://img.test/a.png", "detail": "low"}})
        );
        assert_eq!(parts[2]["image_url"]["url"], "https://img.test/b.png");
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.contains("Images from the page"));
    }

    #[test]
    fn image_urls_are_sent_trimmed() {
        let request = request().with_images([ImageRef::new("  https://img.test/a.png\n", "a")]);
        let body = body_json(&provider(), &request);
        let parts = body["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts[1]["image_url"]["url"], "https://img.test/a.png");
    }

    #[test]
    fn non_web_urls_fall_back_to_text_only() {
        let request = request().with_images([ImageRef::new("data:image/png;base64,AAAA", "x")]);
        let body = body_json(&provider(), &request);
        assert!(body["messages"][1]["content"].is_string());
        assert_eq!(body["messages"][0]["content"], prompt::SYSTEM_INSTRUCTION);
    }

    #[test]
    fn response_text_is_read_from_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Short summary."}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Short summary.");
    }

    #[test]
    fn empty_choices_is_invalid_structure() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(
            response.into_text().unwrap_err(),
            ProviderFailure::Http(HttpFailure::invalid_structure())
        );
    }

    #[test]
    fn advertises_url_attachments() {
        let provider = provider();
        let vision = provider.vision().unwrap();
        assert_eq!(vision.attachment_mode(), AttachmentMode::UrlReference);
    }
}
