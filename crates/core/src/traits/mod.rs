//! Capability traits for the external inference services
//!
//! Each trait is a narrow request/response contract. Implementations live in
//! `signbridge-backends` (HTTP) and in test fakes.

mod speech;
mod text;
mod vision;

pub use speech::{SpeechSynthesizer, SpeechTranscriber};
pub use text::TextRefiner;
pub use vision::Detector;

use std::fmt;
use std::sync::Arc;

/// Which external capability a call or failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Detect,
    Refine,
    Synthesize,
    Transcribe,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Detect => "detect",
            Capability::Refine => "refine",
            Capability::Synthesize => "synthesize",
            Capability::Transcribe => "transcribe",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full set of capability clients the relay needs
#[derive(Clone)]
pub struct Capabilities {
    pub detector: Arc<dyn Detector>,
    pub refiner: Arc<dyn TextRefiner>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
}

impl Capabilities {
    pub fn new(
        detector: Arc<dyn Detector>,
        refiner: Arc<dyn TextRefiner>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
    ) -> Self {
        Self {
            detector,
            refiner,
            synthesizer,
            transcriber,
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("detector", &self.detector.name())
            .field("refiner", &self.refiner.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("transcriber", &self.transcriber.name())
            .finish()
    }
}
