//! Core traits and types for the SignBridge relay
//!
//! This crate provides the foundational types shared by every other crate:
//! - Participant roles and the normalized inbound unit
//! - Detection, refinement, synthesis and transcription result types
//! - Capability traits for the external inference services
//! - Video frame normalization
//! - Error types

pub mod audio;
pub mod detection;
pub mod error;
pub mod frame;
pub mod message;
pub mod role;
pub mod text;
pub mod traits;

pub use audio::{AudioEncoding, SynthesizedAudio};
pub use detection::{BoundingBox, Detection, DetectionResult};
pub use error::{Error, Result};
pub use frame::normalize_frame;
pub use message::{ControlMessage, InboundUnit, OutboundMessage, COMMIT_ACTION};
pub use role::ParticipantRole;
pub use text::{RefineMetadata, RefinedResult, TranscribedText};
pub use traits::{
    Capabilities, Capability, Detector, SpeechSynthesizer, SpeechTranscriber, TextRefiner,
};
