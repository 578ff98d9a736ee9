//! In-process fake of the chat-completion endpoint

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::task::JoinHandle;

/// What the fake endpoint answers with, one per incoming request
#[derive(Clone, Debug)]
pub enum Reply {
    /// 200 with `choices[0].message.content` set to this text
    Content(&'static str),
    /// Bare error status
    Status(u16),
    /// 200 with an empty `choices` array
    NoChoices,
    /// 200 with a body that is not JSON
    Malformed,
}

#[derive(Default)]
struct FakeState {
    replies: Vec<Reply>,
    next: AtomicUsize,
    requests: Mutex<Vec<(Option<String>, Value)>>,
}

/// Running fake endpoint; aborted on drop
pub struct FakeCompletion {
    pub url: String,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeCompletion {
    /// Recorded `(Authorization header, JSON body)` pairs in arrival order
    pub fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for FakeCompletion {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `router` on an ephemeral localhost port, returning its base URL
pub async fn serve_ephemeral(router: Router) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

/// Start a fake completion endpoint. The last reply repeats once the list runs out.
pub async fn spawn_completion(replies: Vec<Reply>) -> FakeCompletion {
    assert!(!replies.is_empty(), "fake endpoint needs at least one reply");

    let state = Arc::new(FakeState {
        replies,
        ..FakeState::default()
    });
    let router = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(state.clone());

    let (base, handle) = serve_ephemeral(router).await;
    FakeCompletion {
        url: format!("{}/chat/completions", base),
        state,
        handle,
    }
}

async fn completions(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.requests.lock().unwrap().push((auth, body));

    let idx = state.next.fetch_add(1, Ordering::SeqCst);
    let reply = state.replies[idx.min(state.replies.len() - 1)].clone();

    match reply {
        Reply::Content(text) => Json(json!({
            "id": "chatcmpl-test",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Reply::Status(code) => (
            StatusCode::from_u16(code).unwrap(),
            "upstream error",
        )
            .into_response(),
        Reply::NoChoices => Json(json!({ "choices": [] })).into_response(),
        Reply::Malformed => (StatusCode::OK, "this is not json").into_response(),
    }
}
