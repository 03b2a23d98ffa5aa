//! Vision traits

use async_trait::async_trait;
use bytes::Bytes;

use crate::{DetectionResult, Result};

/// Gesture/object detection over a single encoded image
///
/// Implementations:
/// - `HttpDetector` - posts the frame to the detection service
#[async_trait]
pub trait Detector: Send + Sync + 'static {
    /// Detect labeled regions in a JPEG-encoded frame
    async fn detect(&self, image: Bytes) -> Result<DetectionResult>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
