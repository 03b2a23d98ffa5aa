//! In-memory connections and capability fakes for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

use signbridge_core::{
    BoundingBox, Capabilities, Capability, Detection, DetectionResult, Detector, Error,
    OutboundMessage, ParticipantRole, RefinedResult, Result, SpeechSynthesizer,
    SpeechTranscriber, SynthesizedAudio, TextRefiner, TranscribedText,
};

use crate::connection::{Connection, ConnectionId, DeliveryError, OutboundFrame};

pub struct RecordingConnection {
    id: ConnectionId,
    role: ParticipantRole,
    closed: AtomicBool,
    fail_sends: AtomicBool,
    close_calls: AtomicUsize,
    batches: Mutex<Vec<Vec<OutboundFrame>>>,
}

impl RecordingConnection {
    pub fn handle(role: ParticipantRole) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            role,
            closed: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        })
    }

    /// A connection whose transport is broken
    pub fn broken(role: ParticipantRole) -> Arc<Self> {
        let conn = Self::handle(role);
        conn.fail_sends.store(true, Ordering::SeqCst);
        conn
    }

    pub fn batches(&self) -> Vec<Vec<OutboundFrame>> {
        self.batches.lock().clone()
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.batches
            .lock()
            .iter()
            .flatten()
            .filter_map(|frame| match frame {
                OutboundFrame::Message(message) => Some(message.clone()),
                OutboundFrame::Binary(_) => None,
            })
            .collect()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn role(&self) -> ParticipantRole {
        self.role
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    async fn send(&self, frames: Vec<OutboundFrame>) -> std::result::Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            self.mark_closed();
            return Err(DeliveryError::Transport("broken pipe".to_string()));
        }
        self.batches.lock().push(frames);
        Ok(())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.mark_closed();
    }
}

/// Pops one pending injected failure, if any
fn take_failure(pending: &AtomicUsize) -> bool {
    pending
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

pub struct FakeDetector {
    labels: Mutex<Vec<String>>,
    failures: AtomicUsize,
    images: Mutex<Vec<Bytes>>,
}

impl FakeDetector {
    pub fn set_labels(&self, labels: &[&str]) {
        *self.labels.lock() = labels.iter().map(|l| l.to_string()).collect();
    }

    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.images.lock().len()
    }

    pub fn images(&self) -> Vec<Bytes> {
        self.images.lock().clone()
    }
}

#[async_trait]
impl Detector for FakeDetector {
    async fn detect(&self, image: Bytes) -> Result<DetectionResult> {
        self.images.lock().push(image);
        if take_failure(&self.failures) {
            return Err(Error::capability(Capability::Detect, "detector unavailable"));
        }
        let detections = self
            .labels
            .lock()
            .iter()
            .map(|label| Detection::new(label.clone(), 0.9, BoundingBox::new(0.0, 0.0, 4.0, 4.0)))
            .collect();
        Ok(DetectionResult::new(detections))
    }

    fn name(&self) -> &str {
        "fake-detect"
    }
}

#[derive(Default)]
pub struct FakeRefiner {
    failures: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl FakeRefiner {
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl TextRefiner for FakeRefiner {
    async fn refine(&self, text: &str) -> Result<RefinedResult> {
        self.inputs.lock().push(text.to_string());
        if take_failure(&self.failures) {
            return Err(Error::capability(Capability::Refine, "refiner unavailable"));
        }
        Ok(RefinedResult::new(format!("refined({})", text)))
    }

    fn name(&self) -> &str {
        "fake-refine"
    }
}

#[derive(Default)]
pub struct FakeSynthesizer {
    inputs: Mutex<Vec<String>>,
}

impl FakeSynthesizer {
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

/// Audio body the fake synthesizer produces for `text`
pub fn fake_audio(text: &str) -> Bytes {
    Bytes::from(format!("RIFF:{}", text))
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        self.inputs.lock().push(text.to_string());
        Ok(SynthesizedAudio::wav(fake_audio(text)))
    }

    fn name(&self) -> &str {
        "fake-synthesize"
    }
}

#[derive(Default)]
pub struct FakeTranscriber {
    text: Mutex<String>,
    calls: AtomicUsize,
}

impl FakeTranscriber {
    pub fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechTranscriber for FakeTranscriber {
    async fn transcribe(&self, _audio: Bytes) -> Result<TranscribedText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TranscribedText::new(self.text.lock().as_str()))
    }

    fn name(&self) -> &str {
        "fake-transcribe"
    }
}

/// Detector that parks each call until released
pub struct GatedDetector {
    labels: Vec<String>,
    entered: Notify,
    gate: Notify,
}

impl GatedDetector {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once a call is parked on the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Detector for GatedDetector {
    async fn detect(&self, _image: Bytes) -> Result<DetectionResult> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(DetectionResult::new(
            self.labels
                .iter()
                .map(|label| Detection::new(label.as_str(), 0.9, BoundingBox::new(0.0, 0.0, 4.0, 4.0)))
                .collect(),
        ))
    }

    fn name(&self) -> &str {
        "gated-detect"
    }
}

/// Fakes for every capability, kept concrete so tests can inspect them
pub struct Fakes {
    pub detector: Arc<FakeDetector>,
    pub refiner: Arc<FakeRefiner>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub transcriber: Arc<FakeTranscriber>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            detector: Arc::new(FakeDetector {
                labels: Mutex::new(vec!["HELLO".to_string()]),
                failures: AtomicUsize::new(0),
                images: Mutex::new(Vec::new()),
            }),
            refiner: Arc::new(FakeRefiner::default()),
            synthesizer: Arc::new(FakeSynthesizer::default()),
            transcriber: Arc::new(FakeTranscriber::default()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            self.detector.clone(),
            self.refiner.clone(),
            self.synthesizer.clone(),
            self.transcriber.clone(),
        )
    }
}

/// A small valid PNG frame
pub fn png_frame() -> Bytes {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 30]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}
