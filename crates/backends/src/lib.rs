//! HTTP capability clients
//!
//! One adapter per external inference service:
//! - `HttpDetector` - gesture detection over a JPEG frame (multipart upload)
//! - `HttpRefiner` - LLM refinement of accumulated sign labels (JSON)
//! - `HttpSynthesizer` - text-to-speech returning an audio body (JSON in, bytes out)
//! - `HttpTranscriber` - speech-to-text over an audio chunk (multipart upload)
//!
//! Calls are single-shot: no retries. Failures are mapped to `BackendError`
//! and then to the capability-tagged core `Error`.

mod client;
pub mod detect;
pub mod refine;
pub mod synthesize;
pub mod transcribe;

pub use detect::HttpDetector;
pub use refine::{parse_refined, HttpRefiner};
pub use synthesize::HttpSynthesizer;
pub use transcribe::HttpTranscriber;

use std::sync::Arc;

use signbridge_config::BackendsConfig;
use signbridge_core::{Capabilities, Capability};
use thiserror::Error;

/// Backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Tag this failure with the capability it came from
    pub fn for_capability(self, capability: Capability) -> signbridge_core::Error {
        signbridge_core::Error::capability(capability, self.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Build HTTP clients for every capability from settings
pub fn http_capabilities(config: &BackendsConfig) -> Result<Capabilities, BackendError> {
    let detector = HttpDetector::new(&config.detect)?;
    let refiner = HttpRefiner::new(&config.refine)?;
    let synthesizer = HttpSynthesizer::new(&config.synthesize)?;
    let transcriber = HttpTranscriber::new(&config.transcribe)?;

    tracing::info!(
        detect = %config.detect.endpoint_url(),
        refine = %config.refine.endpoint_url(),
        synthesize = %config.synthesize.endpoint_url(),
        transcribe = %config.transcribe.endpoint_url(),
        "HTTP capability clients configured"
    );

    Ok(Capabilities::new(
        Arc::new(detector),
        Arc::new(refiner),
        Arc::new(synthesizer),
        Arc::new(transcriber),
    ))
}
