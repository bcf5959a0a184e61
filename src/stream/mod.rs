//! Streaming channel listener
//!
//! Subscribes to the gateway's WebSocket feed in a background task and
//! collects every JSON message until cancelled.

use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::models::StreamMessageKind;

/// Streaming errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Stream connection failed: {0}")]
    Connect(String),

    #[error("Stream connection timed out after {0}ms")]
    ConnectTimeout(u128),
}

/// Background subscription to the streaming endpoint
pub struct StreamListener {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Vec<Value>>,
    shutdown_timeout: Duration,
}

impl StreamListener {
    /// Connect to `url` and start collecting messages.
    ///
    /// `bound` limits both the connect handshake and the later shutdown.
    pub async fn connect(url: &str, bound: Duration) -> Result<Self, StreamError> {
        let (mut ws, _) = timeout(bound, connect_async(url))
            .await
            .map_err(|_| StreamError::ConnectTimeout(bound.as_millis()))?
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        debug!("Stream connected to {}", url);

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut messages = Vec::new();

            loop {
                let next = tokio::select! {
                    _ = &mut cancel_rx => None,
                    next = ws.next() => Some(next),
                };

                match next {
                    None => {
                        let _ = ws.close(None).await;
                        break;
                    }
                    Some(Some(Ok(Message::Text(text)))) => {
                        match serde_json::from_str::<Value>(&text) {
                            Ok(value) => messages.push(value),
                            Err(e) => debug!("Ignoring non-JSON stream message: {}", e),
                        }
                    }
                    Some(Some(Ok(Message::Close(_)))) | Some(None) => break,
                    Some(Some(Ok(_))) => {}
                    Some(Some(Err(e))) => {
                        debug!("Stream read failed: {}", e);
                        break;
                    }
                }
            }

            messages
        });

        Ok(Self {
            cancel: Some(cancel_tx),
            handle,
            shutdown_timeout: bound,
        })
    }

    /// Stop listening and return what was observed
    pub async fn close(mut self) -> StreamObservation {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }

        match timeout(self.shutdown_timeout, &mut self.handle).await {
            Ok(Ok(messages)) => StreamObservation::new(messages),
            Ok(Err(e)) => {
                warn!("Stream listener task failed: {}", e);
                StreamObservation::default()
            }
            Err(_) => {
                warn!("Stream listener did not stop in time");
                StreamObservation::default()
            }
        }
    }
}

impl Drop for StreamListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Messages collected by a listener
#[derive(Clone, Debug, Default)]
pub struct StreamObservation {
    messages: Vec<Value>,
}

impl StreamObservation {
    pub fn new(messages: Vec<Value>) -> Self {
        Self { messages }
    }

    pub fn total(&self) -> usize {
        self.messages.len()
    }

    /// Messages whose `type` field is `kind`
    pub fn count(&self, kind: StreamMessageKind) -> usize {
        self.messages
            .iter()
            .filter(|m| m.get("type").and_then(Value::as_str) == Some(kind.as_str()))
            .count()
    }

    pub fn connected(&self) -> usize {
        self.count(StreamMessageKind::Connected)
    }

    pub fn event_received(&self) -> usize {
        self.count(StreamMessageKind::EventReceived)
    }

    /// Counts recorded as test response data
    pub fn summary(&self) -> Value {
        json!({
            "total_messages": self.total(),
            "connected": self.connected(),
            "event_received": self.event_received(),
        })
    }
}
