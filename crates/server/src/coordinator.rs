//! Relay coordinator
//!
//! Owns the session registry and the accumulation buffer, and runs one
//! processing loop per live connection:
//!
//! - signer frames are detected, echoed back and buffered
//! - a signer commit drains the buffer, refines, synthesizes and delivers to
//!   the hearing participant
//! - hearing audio chunks are transcribed and delivered to the signer
//!
//! Units from one connection are handled strictly in arrival order. A failed
//! backend call aborts only the unit that triggered it.

use std::future::Future;
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::mpsc;

use signbridge_config::{EmptyCommitPolicy, RelayConfig};
use signbridge_core::{
    normalize_frame, Capabilities, Capability, ControlMessage, Error, InboundUnit,
    OutboundMessage, ParticipantRole, RefinedResult, Result, SynthesizedAudio,
};

use crate::buffer::AccumulationBuffer;
use crate::connection::{Connection, ConnectionHandle, OutboundFrame};
use crate::metrics;
use crate::registry::SessionRegistry;

pub struct RelayCoordinator {
    registry: SessionRegistry,
    buffer: AccumulationBuffer,
    capabilities: Capabilities,
    config: RelayConfig,
}

impl RelayCoordinator {
    pub fn new(capabilities: Capabilities, config: RelayConfig) -> Self {
        Self {
            registry: SessionRegistry::new(),
            buffer: AccumulationBuffer::new(),
            capabilities,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    /// Register a new connection for its role. The superseded connection, if
    /// any, is marked closed and returned for the caller to close.
    pub fn attach(&self, connection: ConnectionHandle) -> Option<ConnectionHandle> {
        let role = connection.role();
        let id = connection.id();
        let previous = self.registry.set(role, connection);
        if let Some(previous) = &previous {
            previous.mark_closed();
        }
        tracing::info!(
            role = %role,
            connection_id = %id,
            replaced = previous.is_some(),
            "Participant connected"
        );
        previous
    }

    /// Mark a connection dead and release its slot if it still owns it.
    ///
    /// Returns true when the slot was cleared. Clearing the signer slot also
    /// discards the labels buffered so far.
    pub fn detach(&self, connection: &dyn Connection) -> bool {
        connection.mark_closed();
        let role = connection.role();
        let cleared = self.registry.clear_if_current(role, connection.id());
        if cleared {
            if role == ParticipantRole::Signer {
                let dropped = self.buffer.clear();
                if dropped > 0 {
                    tracing::debug!(labels = dropped, "Discarded buffered labels");
                }
            }
            tracing::info!(
                role = %role,
                connection_id = %connection.id(),
                "Participant disconnected"
            );
        }
        cleared
    }

    /// Whether `connection` is live and still owns its role's slot
    fn is_current(&self, connection: &dyn Connection) -> bool {
        !connection.is_closed()
            && self
                .registry
                .get(connection.role())
                .is_some_and(|current| current.id() == connection.id())
    }

    /// Process units for `connection` until the channel ends or the
    /// connection is closed
    pub async fn run(&self, connection: ConnectionHandle, mut inbound: mpsc::Receiver<InboundUnit>) {
        while let Some(unit) = inbound.recv().await {
            if connection.is_closed() {
                break;
            }
            self.dispatch(connection.as_ref(), unit).await;
        }
        self.detach(connection.as_ref());
    }

    /// Handle one inbound unit. Failures are logged and never end the loop.
    pub async fn dispatch(&self, connection: &dyn Connection, unit: InboundUnit) {
        let role = connection.role();
        let kind = unit.kind();
        metrics::record_unit(role, kind);
        tracing::debug!(role = %role, connection_id = %connection.id(), unit = kind, "Processing unit");

        let result = match (role, unit) {
            (ParticipantRole::Signer, InboundUnit::Frame(frame)) => {
                self.on_frame(connection, frame).await
            }
            (ParticipantRole::Signer, InboundUnit::Control(message)) => {
                self.on_control(message).await
            }
            (ParticipantRole::Hearing, InboundUnit::AudioChunk(chunk)) => {
                self.on_audio(chunk).await
            }
            _ => {
                tracing::debug!(role = %role, unit = kind, "Unit not accepted on this channel");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(
                role = %role,
                connection_id = %connection.id(),
                unit = kind,
                error = %e,
                "Unit processing failed"
            );
            if self.config.notify_errors {
                let notice = OutboundMessage::Error {
                    error: e.to_string(),
                };
                if let Err(e) = connection.send_message(notice).await {
                    tracing::debug!(error = %e, "Error notice not delivered");
                }
            }
        }
    }

    async fn on_frame(&self, connection: &dyn Connection, frame: Bytes) -> Result<()> {
        let image = match tokio::task::spawn_blocking(move || normalize_frame(&frame)).await {
            Ok(Ok(image)) => image,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Dropping undecodable frame");
                metrics::record_frame_dropped();
                return Ok(());
            }
            Err(e) => return Err(Error::Frame(format!("frame task failed: {}", e))),
        };

        let result = timed(Capability::Detect, self.capabilities.detector.detect(image)).await?;
        // The signer may have left or been replaced while detection ran
        if !self.is_current(connection) {
            tracing::debug!(
                connection_id = %connection.id(),
                detections = result.len(),
                "Signer gone, discarding detections"
            );
            return Ok(());
        }
        self.buffer.extend(result.labels().map(str::to_string));
        tracing::debug!(
            detections = result.len(),
            buffered = self.buffer.len(),
            "Frame detected"
        );

        let echo = OutboundMessage::Predictions {
            predictions: result,
        };
        if let Err(e) = connection.send_message(echo).await {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "Predictions not delivered, dropping signer"
            );
            metrics::record_delivery_failed(connection.role());
            self.detach(connection);
        }
        Ok(())
    }

    async fn on_control(&self, message: ControlMessage) -> Result<()> {
        if !message.is_commit() {
            tracing::debug!(action = ?message.action, "Ignoring control message");
            return Ok(());
        }
        self.commit().await
    }

    /// Drain the buffer and deliver its translation to the hearing side
    pub async fn commit(&self) -> Result<()> {
        let labels = self.buffer.drain();
        if labels.is_empty() && self.config.empty_commit == EmptyCommitPolicy::Skip {
            tracing::info!("Empty commit skipped");
            return Ok(());
        }

        let text = labels.join(&self.config.label_separator);
        let (refined, audio) = self.translate(&text).await?;

        let batch = vec![
            OutboundFrame::Message(OutboundMessage::Refined {
                refined_text: refined.text,
            }),
            OutboundFrame::Binary(audio.data),
        ];
        let delivered = self.deliver(ParticipantRole::Hearing, batch).await;
        if delivered {
            metrics::record_translation();
        }
        tracing::info!(labels = labels.len(), delivered, "Translation committed");
        Ok(())
    }

    /// Refine `text`, then synthesize the refined text
    pub async fn translate(&self, text: &str) -> Result<(RefinedResult, SynthesizedAudio)> {
        let refined = timed(Capability::Refine, self.capabilities.refiner.refine(text)).await?;
        let audio = timed(
            Capability::Synthesize,
            self.capabilities.synthesizer.synthesize(&refined.text),
        )
        .await?;
        Ok((refined, audio))
    }

    async fn on_audio(&self, chunk: Bytes) -> Result<()> {
        let transcript = timed(
            Capability::Transcribe,
            self.capabilities.transcriber.transcribe(chunk),
        )
        .await?;
        if transcript.is_silence() {
            tracing::debug!("Empty transcription, nothing to send");
            return Ok(());
        }

        let message = OutboundMessage::SignText {
            asl_text: transcript.text,
        };
        self.deliver(ParticipantRole::Signer, vec![OutboundFrame::Message(message)])
            .await;
        Ok(())
    }

    /// Send a batch to the current connection for `role`.
    ///
    /// A missing peer is not an error. A failed send clears the peer's slot.
    async fn deliver(&self, role: ParticipantRole, frames: Vec<OutboundFrame>) -> bool {
        let Some(peer) = self.registry.get(role) else {
            tracing::debug!(role = %role, "No peer connected, output dropped");
            return false;
        };

        match peer.send(frames).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    role = %role,
                    connection_id = %peer.id(),
                    error = %e,
                    "Delivery failed, clearing slot"
                );
                metrics::record_delivery_failed(role);
                self.detach(peer.as_ref());
                false
            }
        }
    }
}

async fn timed<T, F>(capability: Capability, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = call.await;
    metrics::record_backend_call(capability, start.elapsed(), result.is_ok());
    result
}
