//! In-process PostgREST / GoTrue stand-in for HTTP-level tests.
//!
//! Every request is recorded and answered with one canned status and
//! JSON body.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::{RestClient, RestConfig, RetryPolicy};

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub body: String,
}

struct Shared {
    status: StatusCode,
    body: serde_json::Value,
    hits: Mutex<Vec<Hit>>,
}

pub struct MockServer {
    pub url: String,
    shared: Arc<Shared>,
}

impl MockServer {
    /// Bind `127.0.0.1:0` and answer every request with `status` + `body`.
    pub async fn reply(status: u16, body: serde_json::Value) -> Self {
        let shared = Arc::new(Shared {
            status: StatusCode::from_u16(status).expect("valid status"),
            body,
            hits: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(record).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            url: format!("http://{addr}"),
            shared,
        }
    }

    /// A client for this server with `max_retries` and a 1 ms backoff.
    pub fn client(&self, max_retries: u32) -> RestClient {
        RestClient::new(RestConfig {
            url: self.url.clone(),
            api_key: "test-key".into(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries,
                backoff: Duration::from_millis(1),
            },
        })
        .expect("mock client")
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.shared.hits.lock().expect("hits lock").clone()
    }
}

async fn record(State(shared): State<Arc<Shared>>, method: Method, uri: Uri, body: String) -> Response {
    shared.hits.lock().expect("hits lock").push(Hit {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body,
    });
    (shared.status, axum::Json(shared.body.clone())).into_response()
}
