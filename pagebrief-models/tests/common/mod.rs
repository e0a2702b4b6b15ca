//! Stub transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use pagebrief_models::http::{HttpRequest, HttpResponse, HttpTransport};
use pagebrief_models::{
    DispatchConfig, Dispatcher, ProviderFailure, ProviderRegistry, SummaryRequest, SummaryType,
};

/// What the stub does for a matching URL.
pub enum Reply {
    Respond(HttpResponse),
    Fail(ProviderFailure),
    /// Never answers; resolves only once the cancellation token fires.
    Hang,
}

/// Transport that answers from a route table keyed by URL substring.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<HttpRequest>>,
    cancellations: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url_fragment: &str, reply: Reply) -> Self {
        self.routes.push((url_fragment.to_string(), reply));
        self
    }

    pub fn respond_json(self, url_fragment: &str, status: u16, body: Value) -> Self {
        self.route(url_fragment, Reply::Respond(HttpResponse::json(status, &body)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests that carried a JSON body (the provider calls, not image fetches).
    pub fn posted_bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter_map(|request| request.body)
            .collect()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ProviderFailure> {
        let url = request.url.clone();
        let body_limit = request.body_limit;
        self.requests.lock().unwrap().push(request);

        let reply = self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, reply)| reply);

        match reply {
            Some(Reply::Respond(response)) => match body_limit {
                Some(limit) if response.body.len() > limit => {
                    Err(ProviderFailure::BodyTooLarge { limit })
                }
                _ => Ok(response.clone()),
            },
            Some(Reply::Fail(failure)) => Err(failure.clone()),
            Some(Reply::Hang) => {
                cancel.cancelled().await;
                self.cancellations.fetch_add(1, Ordering::SeqCst);
                Err(ProviderFailure::Cancelled)
            }
            None => Err(ProviderFailure::Transport(format!("no route for {url}"))),
        }
    }
}

/// Dispatcher over the built-in providers, all wired to `stub`.
pub fn dispatcher(stub: &Arc<StubTransport>) -> Dispatcher {
    dispatcher_with(stub, DispatchConfig::default())
}

pub fn dispatcher_with(stub: &Arc<StubTransport>, config: DispatchConfig) -> Dispatcher {
    let transport: Arc<dyn HttpTransport> = stub.clone();
    Dispatcher::new(ProviderRegistry::builtin(transport, &BTreeMap::new()), config)
}

pub fn article() -> SummaryRequest {
    SummaryRequest::new(
        "Rust's ownership model guarantees memory safety without a garbage collector. "
            .repeat(3),
        SummaryType::Brief,
    )
    .unwrap()
    .with_title("Ownership in Rust")
}

pub fn openai_success(text: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

pub fn gemini_success(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}
