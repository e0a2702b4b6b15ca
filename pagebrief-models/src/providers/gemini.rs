//! Google Gemini `generateContent` adapter.
//!
//! The key travels as the `key` query parameter. Images are fetched locally,
//! concurrently, and embedded as base64 `inline_data` parts in extraction
//! order. An image that cannot be fetched or is unsuitable is dropped; if
//! none survive the request goes out text-only.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    Endpoint, MAX_OUTPUT_TOKENS, ProviderSettings, SummaryProvider, TEMPERATURE, VisionInput,
    prompt,
};
use crate::auth::ApiKey;
use crate::failure::{HttpFailure, ProviderFailure};
use crate::http::{HttpRequest, HttpTransport};
use crate::types::{AttachmentMode, ImageRef, SummaryRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Largest image accepted for inline upload.
pub const MAX_INLINE_IMAGE_BYTES: usize = 4 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Gemini Wire Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text at `candidates[0].content.parts[0].text`.
    fn into_text(self) -> Result<String, ProviderFailure> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| HttpFailure::invalid_structure().into())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiProvider
// ────────────────────────────────────────────────────────────────────────────

/// Gemini adapter.
pub struct GeminiProvider {
    endpoint: Endpoint,
    transport: Arc<dyn HttpTransport>,
}

impl GeminiProvider {
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

    fn generate_url(&self, api_key: &ApiKey) -> String {
        self.endpoint.url(&format!(
            "/models/{}:generateContent?key={}",
            self.endpoint.model(),
            urlencoding::encode(api_key.expose_secret())
        ))
    }

    /// Fetch every image concurrently; results keep the input order.
    async fn fetch_images<'a>(
        &self,
        images: &'a [ImageRef],
        cancel: &CancellationToken,
    ) -> Vec<(&'a ImageRef, InlineData)> {
        let fetches = images.iter().map(|image| async move {
            match self.fetch_inline(image, cancel).await {
                Ok(data) => Some((image, data)),
                Err(reason) => {
                    warn!(url = %image.url, %reason, "dropping image attachment");
                    None
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn fetch_inline(
        &self,
        image: &ImageRef,
        cancel: &CancellationToken,
    ) -> Result<InlineData, String> {
        let url = image.url.trim();
        if url.starts_with("data:") {
            return decode_data_url(url);
        }

        let request = HttpRequest::get(url).with_body_limit(MAX_INLINE_IMAGE_BYTES);
        let response = self
            .transport
            .execute(request, cancel)
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("image fetch returned HTTP {}", response.status));
        }
        check_size(response.body.len())?;

        let content_type = response.content_type.as_deref();
        let mime_type = resolve_mime(content_type, url).ok_or_else(|| {
            format!(
                "response is {}, not an image",
                content_type.unwrap_or("untyped")
            )
        })?;

        Ok(InlineData {
            mime_type,
            data: STANDARD.encode(&response.body),
        })
    }

    fn build_request_body(
        &self,
        request: &SummaryRequest,
        attached: &[(&ImageRef, InlineData)],
    ) -> GenerateContentRequest {
        let captions: Vec<&ImageRef> = attached.iter().map(|(image, _)| *image).collect();
        let mut parts = vec![Part::Text {
            text: prompt::user_prompt(request, &captions),
        }];
        parts.extend(attached.iter().map(|(_, data)| Part::Inline {
            inline_data: data.clone(),
        }));

        GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part::Text {
                    text: prompt::system_instruction(!attached.is_empty()),
                }],
            },
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

/// Normalised `image/*` MIME type from a `Content-Type` header value.
fn image_mime(content_type: &str) -> Option<String> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    mime.starts_with("image/").then_some(mime)
}

/// MIME type for a fetched body. The URL extension is consulted only when
/// the server sent no usable type; a non-image type always rejects.
fn resolve_mime(content_type: Option<&str>, url: &str) -> Option<String> {
    let media = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty());
    match media.as_deref() {
        None | Some("application/octet-stream") => mime_from_extension(url),
        Some(media) => image_mime(media),
    }
}

fn mime_from_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Decode a `data:image/...;base64,` URL without touching the network.
fn decode_data_url(url: &str) -> Result<InlineData, String> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| "data URL has no payload".to_string())?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| "data URL is not base64".to_string())?;
    let mime_type =
        image_mime(mime).ok_or_else(|| format!("data URL is {mime}, not an image"))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("data URL payload is not base64: {e}"))?;
    check_size(bytes.len())?;

    Ok(InlineData {
        mime_type,
        data: STANDARD.encode(&bytes),
    })
}

fn check_size(len: usize) -> Result<(), String> {
    if len > MAX_INLINE_IMAGE_BYTES {
        Err(format!("image is {len} bytes, limit is {MAX_INLINE_IMAGE_BYTES}"))
    } else {
        Ok(())
    }
}

impl VisionInput for GeminiProvider {
    fn attachment_mode(&self) -> AttachmentMode {
        AttachmentMode::InlineBytes
    }
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    fn id(&self) -> &'static str {
        "gemini"
    }

    fn name(&self) -> &'static str {
        "Google Gemini"
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
        let attached = self.fetch_images(request.images(), cancel).await;
        if cancel.is_cancelled() {
            return Err(ProviderFailure::Cancelled);
        }
        debug!(
            model = %self.endpoint.model(),
            requested = request.images().len(),
            attached = attached.len(),
            "sending Gemini generateContent"
        );

        let body = serde_json::to_value(self.build_request_body(request, &attached))
            .map_err(|e| ProviderFailure::InvalidRequest(e.to_string()))?;
        self.transport
            .execute(HttpRequest::post_json(self.generate_url(api_key), body), cancel)
            .await?
            .error_for_status()?
            .decode_envelope::<GenerateContentResponse>()?
            .into_text()
    }
}
