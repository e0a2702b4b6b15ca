//! Raw HTTP exchange seam used by every adapter.
//!
//! Adapters describe a request as an [`HttpRequest`] and hand it to an
//! [`HttpTransport`]. The production transport wraps `reqwest`; tests plug
//! in a stub. Every transport must return [`ProviderFailure::Cancelled`]
//! promptly once the cancellation token fires.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::failure::{HttpFailure, ProviderFailure};

/// HTTP method used by adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outbound request description.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Largest response body the caller accepts, in bytes.
    pub body_limit: Option<usize>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            body_limit: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            body_limit: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Fail with [`ProviderFailure::BodyTooLarge`] instead of reading more
    /// than `limit` bytes of response body.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as received from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success response into an [`HttpFailure`], keeping the
    /// provider's `error.message` when the body carries one.
    pub fn error_for_status(self) -> Result<Self, ProviderFailure> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpFailure::new(self.status, error_message(&self.body)).into())
        }
    }

    /// Decode a success envelope.
    ///
    /// A body that is not JSON is [`ProviderFailure::Malformed`]; JSON that
    /// does not fit `T` is the synthetic invalid-structure failure.
    pub fn decode_envelope<T: DeserializeOwned>(&self) -> Result<T, ProviderFailure> {
        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|e| ProviderFailure::Malformed(e.to_string()))?;
        serde_json::from_value(value).map_err(|_| HttpFailure::invalid_structure().into())
    }
}

/// Extract a human-readable message from a provider error body.
///
/// Handles `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`. Anything else yields `None`.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Performs one HTTP exchange, honouring the cancellation token.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ProviderFailure>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ProviderFailure> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let mut response = builder.send().await.map_err(reqwest_failure)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match request.body_limit {
            Some(limit) => read_limited(&mut response, limit).await?,
            None => response.bytes().await.map_err(reqwest_failure)?.to_vec(),
        };

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Read the body chunk by chunk, stopping as soon as it passes `limit`.
async fn read_limited(
    response: &mut reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ProviderFailure> {
    if response
        .content_length()
        .is_some_and(|declared| declared > limit as u64)
    {
        return Err(ProviderFailure::BodyTooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(reqwest_failure)? {
        if body.len() + chunk.len() > limit {
            return Err(ProviderFailure::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ProviderFailure> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProviderFailure::Cancelled),
            result = self.exchange(request) => result,
        }
    }
}

/// Builder errors mean we never produced a valid request; everything else
/// happened on the way to or from the server.
fn reqwest_failure(err: reqwest::Error) -> ProviderFailure {
    if err.is_builder() {
        ProviderFailure::InvalidRequest(err.to_string())
    } else {
        ProviderFailure::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn request_builder_collects_headers() {
        let request = HttpRequest::post_json("https://api.test/v1", json!({"a": 1}))
            .bearer("sk-1")
            .header("X-Extra", "yes");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("authorization"), Some("Bearer sk-1"));
        assert_eq!(request.header_value("x-extra"), Some("yes"));
        assert_eq!(request.header_value("missing"), None);
    }

    #[test]
    fn error_for_status_extracts_nested_message() {
        let response = HttpResponse::json(401, &json!({"error": {"message": "bad key"}}));
        let failure = response.error_for_status().unwrap_err();
        assert_eq!(
            failure,
            ProviderFailure::Http(HttpFailure::new(401, Some("bad key".into())))
        );
    }

    #[test]
    fn error_for_status_tolerates_unparseable_body() {
        let response = HttpResponse::new(502, "<html>Bad Gateway</html>");
        let failure = response.error_for_status().unwrap_err();
        assert_eq!(failure, ProviderFailure::Http(HttpFailure::new(502, None)));
    }

    #[test]
    fn error_message_accepts_flat_shapes() {
        assert_eq!(
            error_message(br#"{"error": "quota"}"#).as_deref(),
            Some("quota")
        );
        assert_eq!(
            error_message(br#"{"message": "oops"}"#).as_deref(),
            Some("oops")
        );
        assert_eq!(error_message(br#"{"error": {"code": 3}}"#), None);
    }

    #[test]
    fn success_passes_through_error_for_status() {
        let response = HttpResponse::json(200, &json!({"ok": true}));
        assert!(response.error_for_status().is_ok());
    }

    #[derive(Debug, Deserialize)]
    struct Envelope {
        #[allow(dead_code)]
        text: String,
    }

    #[test]
    fn decode_envelope_distinguishes_malformed_from_wrong_shape() {
        let not_json = HttpResponse::new(200, "not json");
        assert!(matches!(
            not_json.decode_envelope::<Envelope>(),
            Err(ProviderFailure::Malformed(_))
        ));

        let wrong_shape = HttpResponse::json(200, &json!({"other": 1}));
        assert_eq!(
            wrong_shape.decode_envelope::<Envelope>().unwrap_err(),
            ProviderFailure::Http(HttpFailure::invalid_structure())
        );
    }

    #[tokio::test]
    async fn reqwest_transport_observes_cancellation() {
        let transport = ReqwestTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        // 192.0.2.0/24 is reserved for documentation; biased select returns first
        let result = transport
            .execute(HttpRequest::get("http://192.0.2.1/never"), &cancel)
            .await;
        assert_eq!(result.unwrap_err(), ProviderFailure::Cancelled);
    }

    /// Answer one connection on a loopback port with `head` followed by
    /// `body_len` bytes of body.
    async fn serve_once(head: &'static str, body_len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&vec![0xAB; body_len]).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/photo.png")
    }

    fn loopback_transport() -> ReqwestTransport {
        ReqwestTransport::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn body_limit_is_opt_in() {
        assert_eq!(HttpRequest::get("https://img.test/a.png").body_limit, None);
        let limited = HttpRequest::get("https://img.test/a.png").with_body_limit(1024);
        assert_eq!(limited.body_limit, Some(1024));
    }

    #[tokio::test]
    async fn declared_length_over_limit_is_rejected() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 64\r\n\r\n",
            64,
        )
        .await;
        let result = loopback_transport()
            .execute(
                HttpRequest::get(url).with_body_limit(16),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.unwrap_err(), ProviderFailure::BodyTooLarge { limit: 16 });
    }

    #[tokio::test]
    async fn undeclared_length_stops_at_limit() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nConnection: close\r\n\r\n",
            4096,
        )
        .await;
        let result = loopback_transport()
            .execute(
                HttpRequest::get(url).with_body_limit(1024),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.unwrap_err(), ProviderFailure::BodyTooLarge { limit: 1024 });
    }

    #[tokio::test]
    async fn body_within_limit_is_returned() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 64\r\n\r\n",
            64,
        )
        .await;
        let response = loopback_transport()
            .execute(
                HttpRequest::get(url).with_body_limit(64),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
        assert_eq!(response.body.len(), 64);
    }
}
