//! Synthesized audio payloads

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Container/codec of an audio payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    #[default]
    Wav,
    Mp3,
    Ogg,
    Unknown,
}

impl AudioEncoding {
    /// Map a `Content-Type` header value. A missing header means WAV,
    /// which is what the speech service emits.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return AudioEncoding::Wav;
        };
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => AudioEncoding::Wav,
            "audio/mpeg" | "audio/mp3" => AudioEncoding::Mp3,
            "audio/ogg" | "audio/opus" => AudioEncoding::Ogg,
            _ => AudioEncoding::Unknown,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            AudioEncoding::Wav => "audio/wav",
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::Ogg => "audio/ogg",
            AudioEncoding::Unknown => "application/octet-stream",
        }
    }
}

/// Opaque audio bytes with their declared encoding
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub data: Bytes,
    pub encoding: AudioEncoding,
}

impl SynthesizedAudio {
    pub fn new(data: impl Into<Bytes>, encoding: AudioEncoding) -> Self {
        Self {
            data: data.into(),
            encoding,
        }
    }

    pub fn wav(data: impl Into<Bytes>) -> Self {
        Self::new(data, AudioEncoding::Wav)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
