//! Mock image generation API for integration tests
//!
//! Serves `/v1/images/generations` plus a couple of image routes the
//! generated URLs can point at

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use tokio_util::sync::CancellationToken;

/// PNG magic, served by `/img.png`
pub const PNG_BYTES: [u8; 4] = [137, 80, 78, 71];

/// Mock generation backend with canned or scripted replies
pub struct MockOpenAi {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    addr: SocketAddr,
    generation_count: AtomicU32,
    image_count: AtomicU32,
    /// Scripted generation reply (status, body); `None` serves a URL entry
    reply: Option<(StatusCode, String)>,
    last_request: Mutex<Option<RecordedRequest>>,
}

/// A generation request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl MockOpenAi {
    /// Start a mock whose generation route returns one entry pointing at `/img.png`
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock whose generation route replies with `status` and `body`
    pub async fn start_with_reply(status: u16, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some((StatusCode::from_u16(status)?, body.to_owned()))).await
    }

    async fn start_inner(reply: Option<(StatusCode, String)>) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            addr,
            generation_count: AtomicU32::new(0),
            image_count: AtomicU32::new(0),
            reply,
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/images/generations", routing::post(handle_generation))
            .route("/img.png", routing::get(handle_image))
            .route("/missing.png", routing::get(handle_missing))
            .with_state(Arc::clone(&state));

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

        Ok(Self { addr, shutdown, state })
    }

    /// Generation endpoint URL
    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/images/generations", self.addr)
    }

    /// URL of a route on the mock
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of generation requests received
    pub fn generation_count(&self) -> u32 {
        self.state.generation_count.load(Ordering::Relaxed)
    }

    /// Number of successful image fetches served
    pub fn image_count(&self) -> u32 {
        self.state.image_count.load(Ordering::Relaxed)
    }

    /// Most recent generation request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockOpenAi {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generation(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.generation_count.fetch_add(1, Ordering::Relaxed);

    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    *state.last_request.lock().unwrap() = Some(RecordedRequest { headers, body });

    if let Some((status, body)) = &state.reply {
        return (*status, body.clone()).into_response();
    }

    let response = serde_json::json!({
        "created": 1,
        "data": [{ "url": format!("http://{}/img.png", state.addr) }],
    });

    (StatusCode::OK, response.to_string()).into_response()
}

async fn handle_image(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.image_count.fetch_add(1, Ordering::Relaxed);

    PNG_BYTES.to_vec()
}

async fn handle_missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}
