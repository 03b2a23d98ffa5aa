//! Participant connections
//!
//! A `Connection` is the send half of one live participant channel. The
//! receive half is owned by the gateway reader task.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::SinkExt;
use thiserror::Error;
use uuid::Uuid;

use signbridge_core::{OutboundMessage, ParticipantRole};

/// Unique per accepted connection; used for identity checks on slot cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One element of an outbound batch
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// JSON text message
    Message(OutboundMessage),
    /// Raw binary payload (synthesized audio)
    Binary(Bytes),
}

/// Delivery failures. Any of these means the slot holding the connection
/// should be cleared.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    #[error("Connection closed")]
    Closed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

#[async_trait]
pub trait Connection: Send + Sync + 'static {
    fn id(&self) -> ConnectionId;

    fn role(&self) -> ParticipantRole;

    fn is_closed(&self) -> bool;

    /// Flag the connection dead; later sends fail with `DeliveryError::Closed`
    fn mark_closed(&self);

    /// Send a batch in order. No other send interleaves with the batch.
    async fn send(&self, frames: Vec<OutboundFrame>) -> Result<(), DeliveryError>;

    /// Close the transport (used when a connection is superseded). Must not
    /// depend on the closed flag still being clear.
    async fn close(&self);

    async fn send_message(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        self.send(vec![OutboundFrame::Message(message)]).await
    }
}

pub type ConnectionHandle = Arc<dyn Connection>;

/// WebSocket-backed connection
pub struct WsConnection {
    id: ConnectionId,
    role: ParticipantRole,
    sink: tokio::sync::Mutex<SplitSink<WebSocket, Message>>,
    closed: AtomicBool,
}

impl WsConnection {
    pub fn new(role: ParticipantRole, sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            id: ConnectionId::new(),
            role,
            sink: tokio::sync::Mutex::new(sink),
            closed: AtomicBool::new(false),
        }
    }
}

fn encode(frame: OutboundFrame) -> Result<Message, DeliveryError> {
    match frame {
        OutboundFrame::Message(message) => serde_json::to_string(&message)
            .map(Message::Text)
            .map_err(|e| DeliveryError::Encode(e.to_string())),
        OutboundFrame::Binary(data) => Ok(Message::Binary(data.to_vec())),
    }
}

#[async_trait]
impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn role(&self) -> ParticipantRole {
        self.role
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    async fn send(&self, frames: Vec<OutboundFrame>) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }

        let messages = frames
            .into_iter()
            .map(encode)
            .collect::<Result<Vec<_>, _>>()?;

        // Hold the sink for the whole batch
        let mut sink = self.sink.lock().await;
        for message in messages {
            if let Err(e) = sink.feed(message).await {
                self.mark_closed();
                return Err(DeliveryError::Transport(e.to_string()));
            }
        }
        if let Err(e) = sink.flush().await {
            self.mark_closed();
            return Err(DeliveryError::Transport(e.to_string()));
        }
        Ok(())
    }

    /// Sends the close frame even when already marked closed, since a
    /// superseded connection is marked before it is closed
    async fn close(&self) {
        self.mark_closed();
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            tracing::debug!(connection_id = %self.id, error = %e, "Close frame not sent");
        }
    }
}
