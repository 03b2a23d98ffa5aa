//! Relay behaviour over real WebSocket connections
//!
//! Runs the full router on an ephemeral port with in-process capability fakes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio_tungstenite::tungstenite::Message;

use signbridge_config::Settings;
use signbridge_core::{
    BoundingBox, Capabilities, Detection, DetectionResult, Detector, ParticipantRole,
    RefinedResult, Result, SpeechSynthesizer, SpeechTranscriber, SynthesizedAudio, TextRefiner,
    TranscribedText,
};
use signbridge_server::{create_router, AppState, Connection};

type Client =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct HelloDetector;

#[async_trait]
impl Detector for HelloDetector {
    async fn detect(&self, _image: Bytes) -> Result<DetectionResult> {
        Ok(DetectionResult::new(vec![Detection::new(
            "HELLO",
            0.95,
            BoundingBox::new(1.0, 1.0, 6.0, 6.0),
        )]))
    }

    fn name(&self) -> &str {
        "hello-detect"
    }
}

#[derive(Default)]
struct RecordingRefiner {
    inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl TextRefiner for RecordingRefiner {
    async fn refine(&self, text: &str) -> Result<RefinedResult> {
        self.inputs.lock().push(text.to_string());
        Ok(RefinedResult::new(format!("{}!", text.to_lowercase())))
    }

    fn name(&self) -> &str {
        "recording-refine"
    }
}

struct BytesSynthesizer;

#[async_trait]
impl SpeechSynthesizer for BytesSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        Ok(SynthesizedAudio::wav(format!("WAV:{}", text).into_bytes()))
    }

    fn name(&self) -> &str {
        "bytes-synthesize"
    }
}

struct ScriptedTranscriber {
    text: Mutex<String>,
}

#[async_trait]
impl SpeechTranscriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: Bytes) -> Result<TranscribedText> {
        Ok(TranscribedText::new(self.text.lock().as_str()))
    }

    fn name(&self) -> &str {
        "scripted-transcribe"
    }
}

struct Harness {
    addr: SocketAddr,
    state: AppState,
    refiner: Arc<RecordingRefiner>,
    transcriber: Arc<ScriptedTranscriber>,
}

impl Harness {
    async fn start() -> Self {
        let refiner = Arc::new(RecordingRefiner::default());
        let transcriber = Arc::new(ScriptedTranscriber {
            text: Mutex::new("hi".to_string()),
        });
        let capabilities = Capabilities::new(
            Arc::new(HelloDetector),
            refiner.clone(),
            Arc::new(BytesSynthesizer),
            transcriber.clone(),
        );
        let state = AppState::new(Settings::default(), capabilities);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            refiner,
            transcriber,
        }
    }

    async fn connect(&self, path: &str) -> Client {
        let url = format!("ws://{}{}", self.addr, path);
        let (client, _) = tokio_tungstenite::connect_async(url).await.unwrap();
        client
    }

    fn is_connected(&self, role: ParticipantRole) -> bool {
        self.state.coordinator.registry().is_connected(role)
    }

    async fn wait_for(&self, role: ParticipantRole, connected: bool) {
        for _ in 0..200 {
            if self.is_connected(role) == connected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} never reached connected={}", role, connected);
    }
}

fn png_frame() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 40, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Next data or close message, skipping ping/pong
async fn next_message(client: &mut Client) -> Option<Message> {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a message");
        match next {
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(message)) => return Some(message),
            Some(Err(_)) | None => return None,
        }
    }
}

async fn next_json(client: &mut Client) -> serde_json::Value {
    match next_message(client).await {
        Some(Message::Text(text)) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_signs_become_speech_for_hearing() {
    let harness = Harness::start().await;
    let mut hearing = harness.connect("/ws/hearing").await;
    let mut signer = harness.connect("/ws/signer").await;
    harness.wait_for(ParticipantRole::Hearing, true).await;
    harness.wait_for(ParticipantRole::Signer, true).await;

    for _ in 0..3 {
        signer.send(Message::Binary(png_frame())).await.unwrap();
        let echo = next_json(&mut signer).await;
        assert_eq!(echo["predictions"][0]["class_name"], "HELLO");
    }

    signer
        .send(Message::Text(r#"{"action":"send_translation"}"#.to_string()))
        .await
        .unwrap();

    let refined = next_json(&mut hearing).await;
    assert_eq!(refined["refined_text"], "hello hello hello!");
    match next_message(&mut hearing).await {
        Some(Message::Binary(audio)) => assert_eq!(audio, b"WAV:hello hello hello!".to_vec()),
        other => panic!("expected audio, got {:?}", other),
    }

    assert_eq!(*harness.refiner.inputs.lock(), vec!["HELLO HELLO HELLO"]);
    assert!(harness.state.coordinator.buffer().is_empty());
}

#[tokio::test]
async fn test_speech_becomes_text_for_signer_on_legacy_paths() {
    let harness = Harness::start().await;
    let mut signer = harness.connect("/ws/deaf").await;
    let mut hearing = harness.connect("/ws/normal").await;
    harness.wait_for(ParticipantRole::Signer, true).await;
    harness.wait_for(ParticipantRole::Hearing, true).await;

    hearing.send(Message::Binary(vec![0u8; 64])).await.unwrap();

    let text = next_json(&mut signer).await;
    assert_eq!(text, serde_json::json!({"asl_text": "hi"}));
}

#[tokio::test]
async fn test_silence_and_missing_peer_send_nothing() {
    let harness = Harness::start().await;
    *harness.transcriber.text.lock() = String::new();
    let mut signer = harness.connect("/ws/signer").await;
    let mut hearing = harness.connect("/ws/hearing").await;
    harness.wait_for(ParticipantRole::Hearing, true).await;
    harness.wait_for(ParticipantRole::Signer, true).await;

    hearing.send(Message::Binary(vec![1, 2, 3])).await.unwrap();

    // A frame afterwards proves the signer channel saw nothing in between
    signer.send(Message::Binary(png_frame())).await.unwrap();
    let next = next_json(&mut signer).await;
    assert!(next.get("predictions").is_some(), "unexpected message {}", next);

    // No signer: transcription is dropped and the hearing side stays up
    signer.close(None).await.unwrap();
    harness.wait_for(ParticipantRole::Signer, false).await;
    *harness.transcriber.text.lock() = "hi".to_string();
    hearing.send(Message::Binary(vec![4, 5, 6])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.is_connected(ParticipantRole::Hearing));
}

#[tokio::test]
async fn test_reconnect_supersedes_previous_signer() {
    let harness = Harness::start().await;
    let mut first = harness.connect("/ws/signer").await;
    harness.wait_for(ParticipantRole::Signer, true).await;
    let first_id = harness
        .state
        .coordinator
        .registry()
        .get(ParticipantRole::Signer)
        .unwrap()
        .id();

    let mut second = harness.connect("/ws/signer").await;
    for _ in 0..200 {
        let current = harness
            .state
            .coordinator
            .registry()
            .get(ParticipantRole::Signer)
            .map(|c| c.id());
        if current.is_some() && current != Some(first_id) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // The superseded socket is closed by the server
    match next_message(&mut first).await {
        Some(Message::Close(_)) | None => {}
        other => panic!("expected close, got {:?}", other),
    }
    drop(first);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Its cleanup did not evict the new signer
    assert!(harness.is_connected(ParticipantRole::Signer));
    second.send(Message::Binary(png_frame())).await.unwrap();
    let echo = next_json(&mut second).await;
    assert_eq!(echo["predictions"][0]["class_name"], "HELLO");
}

#[tokio::test]
async fn test_disconnect_clears_slot_and_buffer() {
    let harness = Harness::start().await;
    let mut signer = harness.connect("/ws/signer").await;
    harness.wait_for(ParticipantRole::Signer, true).await;

    signer.send(Message::Binary(png_frame())).await.unwrap();
    next_json(&mut signer).await;
    assert_eq!(harness.state.coordinator.buffer().len(), 1);

    signer.close(None).await.unwrap();
    harness.wait_for(ParticipantRole::Signer, false).await;
    assert!(harness.state.coordinator.buffer().is_empty());
}

#[tokio::test]
async fn test_garbage_inputs_are_ignored() {
    let harness = Harness::start().await;
    let mut signer = harness.connect("/ws/signer").await;
    harness.wait_for(ParticipantRole::Signer, true).await;

    signer.send(Message::Text("{not json".to_string())).await.unwrap();
    signer.send(Message::Binary(b"not an image".to_vec())).await.unwrap();
    signer
        .send(Message::Text(r#"{"action":"unknown"}"#.to_string()))
        .await
        .unwrap();
    signer.send(Message::Binary(png_frame())).await.unwrap();

    // Only the valid frame produced output
    let echo = next_json(&mut signer).await;
    assert_eq!(echo["predictions"][0]["class_name"], "HELLO");
    assert!(harness.refiner.inputs.lock().is_empty());
    assert!(harness.is_connected(ParticipantRole::Signer));
}
