use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A request the stub received.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub uri: String,
    pub body: serde_json::Value,
    /// Client end of the connection the request arrived on.
    pub peer: SocketAddr,
}

/// Local stand-in for the Gemini API that replays a scripted list of responses.
pub struct GeminiStub {
    base_url: String,
    state: Arc<StubState>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

struct StubState {
    script: Mutex<VecDeque<(StatusCode, String)>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// Successful `generateContent` body whose first part is `text`.
pub fn text_response(text: &str) -> String {
    serde_json::json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}
        ]
    })
    .to_string()
}

impl GeminiStub {
    pub async fn start(script: Vec<(StatusCode, String)>) -> Self {
        let state = Arc::new(StubState {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind gemini stub");
        let addr = listener.local_addr().expect("gemini stub local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        );
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Gemini stub server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        GeminiStub {
            base_url: format!("http://{}", addr),
            state,
            shutdown: Mutex::new(Some(tx)),
        }
    }

    pub fn url(&self) -> String {
        self.base_url.clone()
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Scripted responses that were never requested.
    pub fn remaining(&self) -> usize {
        self.state.script.lock().unwrap().len()
    }
}

impl Drop for GeminiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.lock().unwrap().take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let parsed = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.requests.lock().unwrap().push(CapturedRequest {
        uri: uri.to_string(),
        body: parsed,
        peer,
    });

    let next = state.script.lock().unwrap().pop_front();
    let (status, body) = next.unwrap_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        "stub script exhausted".to_string(),
    ));
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
}
