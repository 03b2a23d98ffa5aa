//! Inbound units and outbound channel messages

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{DetectionResult, Error, Result};

/// Control action that commits the accumulated labels for translation
pub const COMMIT_ACTION: &str = "send_translation";

/// Structured text message from the signer channel, e.g.
/// `{"action": "send_translation"}`. Unknown fields are kept but ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ControlMessage {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn commit() -> Self {
        Self::new(COMMIT_ACTION)
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::InvalidInput(format!("invalid control message: {}", e)))
    }

    pub fn is_commit(&self) -> bool {
        self.action.as_deref() == Some(COMMIT_ACTION)
    }
}

/// What the coordinator consumes, independent of wire encoding
#[derive(Debug, Clone, PartialEq)]
pub enum InboundUnit {
    /// Encoded video frame from the signer
    Frame(Bytes),
    /// Control message from the signer
    Control(ControlMessage),
    /// Encoded speech audio from the hearing participant
    AudioChunk(Bytes),
}

impl InboundUnit {
    /// Short tag for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            InboundUnit::Frame(_) => "frame",
            InboundUnit::Control(_) => "control",
            InboundUnit::AudioChunk(_) => "audio",
        }
    }
}

/// JSON messages sent to participants.
///
/// Untagged: each variant serializes to a plain object keyed by its single
/// field, matching what the clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// `{"predictions": [...]}` to the signer after each frame
    Predictions { predictions: DetectionResult },
    /// `{"asl_text": "..."}` to the signer when speech is transcribed
    SignText { asl_text: String },
    /// `{"refined_text": "..."}` to the hearing side, ahead of the audio
    Refined { refined_text: String },
    /// `{"error": "..."}` best-effort failure notice
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Detection};

    #[test]
    fn test_commit_detection() {
        let msg = ControlMessage::parse(r#"{"action":"send_translation"}"#).unwrap();
        assert!(msg.is_commit());

        let msg = ControlMessage::parse(r#"{"action":"wave","hand":"left"}"#).unwrap();
        assert!(!msg.is_commit());
        assert_eq!(msg.extra["hand"], "left");

        let msg = ControlMessage::parse("{}").unwrap();
        assert!(!msg.is_commit());
    }

    #[test]
    fn test_non_object_control_rejected() {
        assert!(ControlMessage::parse("not json").is_err());
        assert!(ControlMessage::parse("[1,2]").is_err());
    }

    #[test]
    fn test_outbound_shapes() {
        let msg = OutboundMessage::SignText {
            asl_text: "hi".to_string(),
        };
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"asl_text":"hi"}"#);

        let msg = OutboundMessage::Refined {
            refined_text: "Hello.".to_string(),
        };
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"refined_text":"Hello."}"#);

        let msg = OutboundMessage::Predictions {
            predictions: DetectionResult::new(vec![Detection::new(
                "A",
                0.5,
                BoundingBox::default(),
            )]),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["predictions"][0]["class_name"], "A");
    }
}
