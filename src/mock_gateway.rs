//! In-process gateway used by async tests
//!
//! Serves the FanPulse HTTP contract on one ephemeral port and the event
//! stream on another, both bound to 127.0.0.1.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::generator::DEFAULT_DEVICE_ID;
use crate::models::{ChantEvent, REQUIRED_METRICS};

const BODY_LIMIT: usize = 16 * 1024;
const EVENTS_PER_BATCH: u64 = 5;

#[derive(Clone, Debug)]
pub struct MockOptions {
    /// Accept every well-formed JSON body without validation or replay checks
    pub accept_all: bool,
    /// Delay before answering an event submission
    pub event_delay: Duration,
    /// Health reports 503
    pub unhealthy: bool,
    /// Omit `fanpulse_queue_length` from the metrics body
    pub missing_metric: bool,
    /// Status answers 500
    pub broken_status: bool,
    /// Do not serve the stream; its URL points at a closed port
    pub without_stream: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            accept_all: false,
            event_delay: Duration::ZERO,
            unhealthy: false,
            missing_metric: false,
            broken_status: false,
            without_stream: false,
        }
    }
}

struct MockState {
    options: MockOptions,
    /// Canonical bodies already accepted
    seen: Mutex<HashSet<String>>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    stream_tx: broadcast::Sender<Value>,
}

pub struct MockGateway {
    http_addr: SocketAddr,
    ws_addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockGateway {
    pub async fn start(options: MockOptions) -> Self {
        let (stream_tx, _) = broadcast::channel(64);
        let without_stream = options.without_stream;
        let state = Arc::new(MockState {
            options,
            seen: Mutex::new(HashSet::new()),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            stream_tx,
        });

        let http = Router::new()
            .route("/health", get(health))
            .route("/events", post(submit_event))
            .route("/status", get(status))
            .route("/metrics", get(metrics))
            .layer(DefaultBodyLimit::max(BODY_LIMIT))
            .with_state(state.clone());
        let http_addr = serve(http).await;

        let ws_addr = if without_stream {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        } else {
            let ws = Router::new()
                .route("/", get(stream))
                .with_state(state.clone());
            serve(ws).await
        };

        Self {
            http_addr,
            ws_addr,
            state,
        }
    }

    pub fn http_url(&self) -> String {
        format!("http://{}", self.http_addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.ws_addr)
    }

    pub fn accepted(&self) -> u64 {
        self.state.accepted.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> u64 {
        self.state.rejected.load(Ordering::SeqCst)
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn health(State(state): State<Arc<MockState>>) -> Response {
    if state.options.unhealthy {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "degraded"})),
        )
            .into_response();
    }
    Json(json!({
        "status": "healthy",
        "uptime": 42,
        "services": {"queue": "up", "stream": "up"},
    }))
    .into_response()
}

async fn submit_event(State(state): State<Arc<MockState>>, Json(payload): Json<Value>) -> Response {
    if !state.options.event_delay.is_zero() {
        tokio::time::sleep(state.options.event_delay).await;
    }

    if state.options.accept_all {
        state.accepted.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response();
    }

    let (status, reason) = judge(&state, &payload);
    if status != StatusCode::ACCEPTED {
        state.rejected.fetch_add(1, Ordering::SeqCst);
        return (status, Json(json!({"error": reason}))).into_response();
    }

    state.accepted.fetch_add(1, Ordering::SeqCst);
    let _ = state.stream_tx.send(json!({
        "type": "event_received",
        "deviceId": payload.get("deviceId"),
    }));
    (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response()
}

fn judge(state: &MockState, payload: &Value) -> (StatusCode, &'static str) {
    let event: ChantEvent = match serde_json::from_value(payload.clone()) {
        Ok(event) => event,
        Err(_) => return (StatusCode::BAD_REQUEST, "schema"),
    };
    if !event.is_valid() {
        return (StatusCode::BAD_REQUEST, "validation");
    }
    if event.device_id != DEFAULT_DEVICE_ID {
        return (StatusCode::FORBIDDEN, "unauthorized device");
    }
    let fresh = state.seen.lock().unwrap().insert(payload.to_string());
    if !fresh {
        return (StatusCode::CONFLICT, "replay");
    }
    (StatusCode::ACCEPTED, "")
}

async fn status(State(state): State<Arc<MockState>>) -> Response {
    if state.options.broken_status {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let accepted = state.accepted.load(Ordering::SeqCst);
    Json(json!({
        "events": {
            "totalProcessed": accepted,
            "rejected": state.rejected.load(Ordering::SeqCst),
        },
        "batches": {"total": accepted.div_ceil(EVENTS_PER_BATCH)},
        "config": {"batchSize": EVENTS_PER_BATCH},
        "stats": {},
        "system": {"version": "test"},
    }))
    .into_response()
}

async fn metrics(State(state): State<Arc<MockState>>) -> String {
    let accepted = state.accepted.load(Ordering::SeqCst);
    let mut body = String::new();
    for name in REQUIRED_METRICS {
        if state.options.missing_metric && name == "fanpulse_queue_length" {
            continue;
        }
        body.push_str(&format!("# TYPE {name} gauge\n{name} {accepted}\n"));
    }
    body
}

async fn stream(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> Response {
    ws.on_upgrade(move |socket| feed(socket, state))
}

async fn feed(mut socket: WebSocket, state: Arc<MockState>) {
    let mut events = state.stream_tx.subscribe();
    if socket
        .send(Message::Text(json!({"type": "connected"}).to_string()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        let outgoing = tokio::select! {
            event = events.recv() => event.ok(),
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => None,
            },
        };
        if let Some(event) = outgoing {
            if socket.send(Message::Text(event.to_string())).await.is_err() {
                return;
            }
        }
    }
}
