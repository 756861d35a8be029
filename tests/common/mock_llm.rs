//! Local stand-in for the OpenAI and Gemini HTTP APIs
//!
//! Lets end-to-end tests drive the real provider adapters over HTTP
//! without leaving the machine.

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// How one mocked API answers.
#[derive(Clone)]
pub enum MockReply {
    /// 200 with this text as the model output.
    Text(String),
    /// Non-success HTTP status.
    Status(u16),
}

struct MockState {
    openai: MockReply,
    gemini: MockReply,
    openai_hits: AtomicUsize,
    gemini_hits: AtomicUsize,
}

pub struct MockLlmServer {
    pub base_url: String,
    state: Arc<MockState>,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

fn error_status(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "mock upstream error").into_response()
}

async fn chat_completions(State(state): State<Arc<MockState>>) -> Response {
    state.openai_hits.fetch_add(1, Ordering::SeqCst);
    match &state.openai {
        MockReply::Text(text) => Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        }))
        .into_response(),
        MockReply::Status(status) => error_status(*status),
    }
}

async fn generate_content(
    State(state): State<Arc<MockState>>,
    Path(_model_action): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    state.gemini_hits.fetch_add(1, Ordering::SeqCst);
    // The key travels in a header, never in the URL
    if !headers.contains_key("x-goog-api-key") || query.is_some_and(|q| q.contains("key=")) {
        return error_status(401);
    }
    match &state.gemini {
        MockReply::Text(text) => Json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .into_response(),
        MockReply::Status(status) => error_status(*status),
    }
}

impl MockLlmServer {
    pub async fn spawn(openai: MockReply, gemini: MockReply) -> Self {
        let state = Arc::new(MockState {
            openai,
            gemini,
            openai_hits: AtomicUsize::new(0),
            gemini_hits: AtomicUsize::new(0),
        });
        let app = Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/models/{model_action}", post(generate_content))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock LLM server");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock LLM server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn openai_hits(&self) -> usize {
        self.state.openai_hits.load(Ordering::SeqCst)
    }

    pub fn gemini_hits(&self) -> usize {
        self.state.gemini_hits.load(Ordering::SeqCst)
    }
}
