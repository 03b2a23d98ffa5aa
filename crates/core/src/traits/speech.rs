//! Speech processing traits

use async_trait::async_trait;
use bytes::Bytes;

use crate::{Result, SynthesizedAudio, TranscribedText};

/// Text-to-Speech interface
///
/// Implementations:
/// - `HttpSynthesizer` - speech service returning a WAV body
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text to an encoded audio payload
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio>;

    /// Get model name for logging
    fn name(&self) -> &str;
}

/// Speech-to-Text interface
///
/// Implementations:
/// - `HttpTranscriber` - uploads the chunk to the transcription service
///
/// An empty transcript is a successful result meaning "no speech".
#[async_trait]
pub trait SpeechTranscriber: Send + Sync + 'static {
    /// Transcribe one encoded audio chunk
    async fn transcribe(&self, audio: Bytes) -> Result<TranscribedText>;

    /// Get model name for logging
    fn name(&self) -> &str;
}
