//! Mock provider backend for integration tests
//!
//! One axum server impersonating every upstream API the clients speak:
//! OpenAI Responses, Chat Completions, Anthropic Messages, and Google
//! `generateContent`. Handlers derive their canned response from the
//! request shape (structured output mechanism present or not, stream flag
//! set or not) and record the last body seen per route so tests can
//! assert on the encoded wire format.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    request_count: AtomicU32,
    fail_count: AtomicU32,
    last_responses_body: Mutex<Option<Value>>,
    last_chat_body: Mutex<Option<Value>>,
    last_messages_body: Mutex<Option<Value>>,
    last_generate_body: Mutex<Option<Value>>,
}

impl MockProvider {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0).await
    }

    /// Start a mock server that fails the first `n` requests with 500
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        Self::start_inner(n).await
    }

    async fn start_inner(fail_count: u32) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            fail_count: AtomicU32::new(fail_count),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/v1/responses", routing::post(handle_responses))
            .route("/v1/chat/completions", routing::post(handle_chat))
            .route("/v1/messages", routing::post(handle_messages))
            .route("/v1beta/models/{model_action}", routing::post(handle_generate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            state,
        })
    }

    /// Base URL for the OpenAI-style endpoints (`/v1/...`)
    pub fn openai_base(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Google-style endpoints (`/v1beta/...`)
    pub fn google_base(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Total requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Last body posted to `/v1/responses`
    pub fn last_responses_request(&self) -> Option<Value> {
        self.state.last_responses_body.lock().unwrap().clone()
    }

    /// Last body posted to `/v1/chat/completions`
    pub fn last_chat_request(&self) -> Option<Value> {
        self.state.last_chat_body.lock().unwrap().clone()
    }

    /// Last body posted to `/v1/messages`
    pub fn last_messages_request(&self) -> Option<Value> {
        self.state.last_messages_body.lock().unwrap().clone()
    }

    /// Last body posted to a `generateContent` URL
    pub fn last_generate_request(&self) -> Option<Value> {
        self.state.last_generate_body.lock().unwrap().clone()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Intentional failure, when armed
fn take_failure(state: &MockState) -> Option<(StatusCode, Json<Value>)> {
    if state.fail_count.load(Ordering::Relaxed) > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return Some((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "mock intentional failure"}})),
        ));
    }
    None
}

// -- OpenAI Responses --

async fn handle_responses(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_responses_body.lock().unwrap() = Some(body.clone());

    if let Some(failure) = take_failure(&state) {
        return failure.into_response();
    }

    if body.get("stream").and_then(Value::as_bool).unwrap_or(false) {
        return responses_sse_body().into_response();
    }

    let structured = body.get("text").is_some();
    let text = if structured { r#"{"a":1}"# } else { "hi there" };
    Json(json!({
        "id": "resp_mock_1",
        "model": body["model"],
        "output": [
            {"type": "message", "content": [{"type": "output_text", "text": text}]}
        ],
        "usage": {"input_tokens": 3, "output_tokens": 2}
    }))
    .into_response()
}

/// Responses API SSE transcript: lifecycle frames, two text deltas, one
/// malformed frame, tool-call argument fragments, completion, a [DONE]
/// marker, and one frame after [DONE] that must never surface
fn responses_sse_body() -> impl IntoResponse {
    let mut body = String::new();
    let frames: [(&str, String); 8] = [
        ("response.created", json!({"response": {"id": "resp_s", "status": "in_progress"}}).to_string()),
        ("response.output_text.delta", json!({"item_id": "msg_1", "delta": "hi "}).to_string()),
        ("message", "{not json".to_owned()),
        ("response.output_text.delta", json!({"item_id": "msg_1", "delta": "there"}).to_string()),
        ("response.function_call_arguments.delta",
            json!({"item_id": "fc_1", "output_index": 1, "delta": "{\"city\""}).to_string()),
        ("response.function_call_arguments.delta",
            json!({"item_id": "fc_1", "output_index": 1, "delta": ":\"Oslo\"}"}).to_string()),
        ("response.output_item.done",
            json!({"item_id": "fc_1", "output_index": 1,
                   "output": {"tool_call": {"id": "fc_1", "type": "function", "name": "get_weather"}}}).to_string()),
        ("response.completed", json!({"response": {"id": "resp_s", "status": "completed"}}).to_string()),
    ];
    for (event, data) in frames {
        body.push_str(&format!("event: {event}\ndata: {data}\n\n"));
    }
    body.push_str(": heartbeat comment, ignored\n\n");
    body.push_str("data: [DONE]\n\n");
    // Anything after the sentinel must be dropped
    body.push_str(&format!(
        "event: response.output_text.delta\ndata: {}\n\n",
        json!({"delta": "never seen"})
    ));

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
}

// -- Chat Completions --

async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_chat_body.lock().unwrap() = Some(body.clone());

    if let Some(failure) = take_failure(&state) {
        return failure.into_response();
    }

    if body.get("stream").and_then(Value::as_bool).unwrap_or(false) {
        return chat_sse_body().into_response();
    }

    let structured = body.get("response_format").is_some();
    let content = if structured { r#"{"a":1}"# } else { "hi there" };
    Json(json!({
        "id": "chatcmpl_mock_1",
        "model": body["model"],
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 7, "completion_tokens": 4, "total_tokens": 11}
    }))
    .into_response()
}

/// Legacy chat-completions SSE transcript: nameless delta frames with one
/// malformed frame in the middle
fn chat_sse_body() -> impl IntoResponse {
    let mut body = String::new();
    for chunk in ["ab", "cd"] {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"delta": {"content": chunk}}]})
        ));
        if chunk == "ab" {
            body.push_str("data: {broken\n\n");
        }
    }
    body.push_str("data: [DONE]\n\n");

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
}

// -- Anthropic Messages --

async fn handle_messages(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_messages_body.lock().unwrap() = Some(body.clone());

    if let Some(failure) = take_failure(&state) {
        return failure.into_response();
    }

    let content = if body.get("tools").is_some() {
        json!([{"type": "tool_use", "id": "tu_1", "name": "responseSchema", "input": {"a": 1}}])
    } else {
        json!([{"type": "text", "text": "hi there"}])
    };
    Json(json!({
        "id": "msg_mock_1",
        "model": body["model"],
        "content": content,
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 3, "output_tokens": 2}
    }))
    .into_response()
}

// -- Google generateContent --

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_generate_body.lock().unwrap() = Some(body.clone());

    if let Some(failure) = take_failure(&state) {
        return failure.into_response();
    }

    let structured = body
        .get("generationConfig")
        .and_then(|c| c.get("responseJsonSchema"))
        .is_some();
    let text = if structured { r#"{"a":1}"# } else { "hi there" };
    Json(json!({
        "responseId": "gen_mock_1",
        "modelVersion": "mock-gemini",
        "candidates": [{"content": {"parts": [{"text": text}]}}],
        "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2}
    }))
    .into_response()
}
