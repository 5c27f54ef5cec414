//! Test harness for driving the catalog engine against a scripted,
//! in-process stand-in for the Fake Store API.
//!
//! [`MockFakeStore`] binds an `axum` router to an ephemeral port, answers
//! every request from a FIFO queue of [`MockResponse`]s, and captures each
//! request for assertions. Tests enqueue exactly the responses their flow
//! needs; when the queue runs dry, a bland `200 {"ok": true}` is served so
//! fire-for-realism writes never hang a test.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::any;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

use bazaar_catalog::CatalogConfig;

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method as text.
    pub method: String,
    /// Path plus query string.
    pub path: String,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// The body decoded as JSON, when it is JSON.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// A scripted response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code to answer with.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
    /// Delay before answering, for timeout tests.
    pub delay: Duration,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            body: br#"{"ok": true}"#.to_vec(),
            delay: Duration::ZERO,
        }
    }
}

impl MockResponse {
    /// A 200 response carrying the given JSON value.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string().into_bytes(),
            ..Self::default()
        }
    }

    /// An error response with a small JSON body.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: format!(r#"{{"error": "{message}"}}"#).into_bytes(),
            ..Self::default()
        }
    }

    /// Delay the response, e.g. past a client timeout.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

/// In-process stand-in for the Fake Store API.
pub struct MockFakeStore {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    state: MockState,
    server: tokio::task::JoinHandle<()>,
}

impl MockFakeStore {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics when no local port can be bound; test-only code.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .fallback(any(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the mock server.
    ///
    /// # Panics
    ///
    /// Panics when the bound address does not form a URL; test-only code.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// A client configuration pointed at this server, with short timeouts
    /// and backoff so failure paths stay fast.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url(),
            list_timeout: Duration::from_millis(500),
            item_timeout: Duration::from_millis(500),
            max_retries: 2,
            retry_backoff_base: Duration::from_millis(10),
            ..CatalogConfig::default()
        }
    }

    /// Queue the next response.
    pub async fn enqueue(&self, response: MockResponse) {
        self.state.responses.lock().await.push_back(response);
    }

    /// Queue the same response several times.
    pub async fn enqueue_repeated(&self, response: MockResponse, count: usize) {
        let mut queue = self.state.responses.lock().await;
        for _ in 0..count {
            queue.push_back(response.clone());
        }
    }

    /// Requests captured so far.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }
}

impl Drop for MockFakeStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(State(state): State<MockState>, request: Request<Body>) -> Response<Body> {
    let method = request.method().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map(|b| b.to_vec())
        .unwrap_or_default();

    state.requests.lock().await.push(CapturedRequest {
        method,
        path,
        body,
    });

    let response = state
        .responses
        .lock()
        .await
        .pop_front()
        .unwrap_or_default();

    if response.delay > Duration::ZERO {
        tokio::time::sleep(response.delay).await;
    }

    Response::builder()
        .status(StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header("content-type", "application/json")
        .body(Body::from(response.body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Product JSON in the Fake Store wire shape.
#[must_use]
pub fn product_json(id: i64, title: &str, price: f64, category: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "price": price,
        "description": format!("{title} description"),
        "category": category,
        "image": format!("https://example.com/{id}.jpg"),
        "rating": { "rate": 3.9, "count": 120 }
    })
}
