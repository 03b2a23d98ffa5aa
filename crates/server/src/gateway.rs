//! WebSocket gateway
//!
//! Accepts role-tagged upgrades, registers the connection and wires a reader
//! task to the coordinator's processing loop through a bounded channel.
//!
//! The reader never stops reading while the loop is busy, so a close from the
//! peer is always seen. Units that do not fit the queue wait in a backlog of
//! the same size; once that is full, new units are dropped.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc::{self, error::TrySendError};

use signbridge_core::{ControlMessage, InboundUnit, ParticipantRole};

use crate::connection::{Connection, ConnectionHandle, WsConnection};
use crate::metrics;
use crate::state::AppState;

/// Upper bound on the close handshake with a superseded connection
const SUPERSEDED_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket gateway
pub struct Gateway;

impl Gateway {
    /// `GET /ws/signer`
    pub async fn signer(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
        Self::upgrade(ws, state, ParticipantRole::Signer)
    }

    /// `GET /ws/hearing`
    pub async fn hearing(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
        Self::upgrade(ws, state, ParticipantRole::Hearing)
    }

    fn upgrade(ws: WebSocketUpgrade, state: AppState, role: ParticipantRole) -> Response {
        let max_message_bytes = state.config.read().server.max_message_bytes;
        ws.max_message_size(max_message_bytes)
            .max_frame_size(max_message_bytes)
            .on_upgrade(move |socket| Self::handle_socket(socket, state, role))
    }

    async fn handle_socket(socket: WebSocket, state: AppState, role: ParticipantRole) {
        let capacity = state.config.read().server.inbound_queue_capacity;
        let coordinator = state.coordinator.clone();

        let (sender, receiver) = socket.split();
        let connection: ConnectionHandle = Arc::new(WsConnection::new(role, sender));
        let connection_id = connection.id();
        metrics::record_connection_opened(role);

        if let Some(previous) = coordinator.attach(connection.clone()) {
            tracing::info!(
                role = %role,
                connection_id = %previous.id(),
                "Closing superseded connection"
            );
            tokio::spawn(close_superseded(previous));
        }

        let (unit_tx, unit_rx) = mpsc::channel::<InboundUnit>(capacity);
        let processor = {
            let coordinator = coordinator.clone();
            let connection = connection.clone();
            tokio::spawn(async move { coordinator.run(connection, unit_rx).await })
        };

        let dropped = read_units(connection.as_ref(), receiver, &unit_tx, capacity).await;

        coordinator.detach(connection.as_ref());
        drop(unit_tx);
        if let Err(e) = processor.await {
            tracing::warn!(role = %role, connection_id = %connection_id, error = %e, "Processing task failed");
        }

        metrics::record_connection_closed(role);
        tracing::info!(role = %role, connection_id = %connection_id, dropped, "WebSocket closed");
    }
}

async fn close_superseded(previous: ConnectionHandle) {
    if tokio::time::timeout(SUPERSEDED_CLOSE_TIMEOUT, previous.close())
        .await
        .is_err()
    {
        tracing::debug!(connection_id = %previous.id(), "Superseded connection did not close in time");
    }
}

/// Forward decoded units from `stream` to the processing loop until the peer
/// closes or `connection` is marked closed. Returns how many units were
/// dropped for lack of room.
async fn read_units<S>(
    connection: &dyn Connection,
    mut stream: S,
    unit_tx: &mpsc::Sender<InboundUnit>,
    capacity: usize,
) -> usize
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let role = connection.role();
    let mut backlog: VecDeque<InboundUnit> = VecDeque::with_capacity(capacity);
    let mut dropped = 0;

    loop {
        if connection.is_closed() {
            break;
        }

        let next = if backlog.is_empty() {
            stream.next().await
        } else {
            tokio::select! {
                biased;
                permit = unit_tx.reserve() => {
                    let Ok(permit) = permit else {
                        break;
                    };
                    if let Some(unit) = backlog.pop_front() {
                        permit.send(unit);
                    }
                    continue;
                }
                next = stream.next() => next,
            }
        };

        let msg = match next {
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::debug!(role = %role, connection_id = %connection.id(), error = %e, "WebSocket error");
                break;
            }
        };
        let Some(unit) = decode_inbound(role, msg) else {
            continue;
        };

        // Order is kept: nothing bypasses a non-empty backlog
        if backlog.is_empty() {
            match unit_tx.try_send(unit) {
                Ok(()) => {}
                Err(TrySendError::Full(unit)) => backlog.push_back(unit),
                Err(TrySendError::Closed(_)) => break,
            }
        } else if backlog.len() < capacity {
            backlog.push_back(unit);
        } else {
            let kind = unit.kind();
            tracing::debug!(role = %role, unit = kind, "Inbound queue full, dropping unit");
            metrics::record_unit_dropped(role, kind);
            dropped += 1;
        }
    }

    dropped
}

/// Map a WebSocket message to the unit the role's loop consumes
pub fn decode_inbound(role: ParticipantRole, msg: Message) -> Option<InboundUnit> {
    match (role, msg) {
        (ParticipantRole::Signer, Message::Binary(data)) => Some(InboundUnit::Frame(Bytes::from(data))),
        (ParticipantRole::Signer, Message::Text(text)) => match ControlMessage::parse(&text) {
            Ok(control) => Some(InboundUnit::Control(control)),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed control message");
                None
            }
        },
        (ParticipantRole::Hearing, Message::Binary(data)) => {
            Some(InboundUnit::AudioChunk(Bytes::from(data)))
        }
        (ParticipantRole::Hearing, Message::Text(_)) => {
            tracing::debug!("Ignoring text on hearing channel");
            None
        }
        // Ping/Pong are answered by axum
        _ => None,
    }
}
