//! Text results from the refine and transcribe services

use serde::{Deserialize, Serialize};

/// Optional metadata some refine deployments attach to their output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefineMetadata {
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Refined, grammatical rendering of accumulated sign labels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefinedResult {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RefineMetadata>,
}

impl RefinedResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: RefineMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Speech transcription. Empty text means no speech was detected,
/// which is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranscribedText {
    pub text: String,
}

impl TranscribedText {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
        }
    }

    pub fn silence() -> Self {
        Self::default()
    }

    pub fn is_silence(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_trimmed() {
        assert!(TranscribedText::new("  \n").is_silence());
        assert_eq!(TranscribedText::new(" hi ").text, "hi");
    }
}
