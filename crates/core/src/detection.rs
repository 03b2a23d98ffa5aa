//! Object/gesture detection results

use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// A single labeled detection.
///
/// Serialized with the detection service's field names (`class_name`,
/// `confidence`, `x1`..`y2`) so predictions can be echoed to the signer as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class_name")]
    pub label: String,
    pub confidence: f32,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
            bbox,
        }
    }
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Ordered detections produced for one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionResult(pub Vec<Detection>);

impl DetectionResult {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self(detections)
    }

    /// Clamp every confidence into [0, 1]
    pub fn normalized(mut self) -> Self {
        for detection in &mut self.0 {
            detection.confidence = clamp_confidence(detection.confidence);
        }
        self
    }

    /// Labels in detection order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|d| d.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Detection> {
        self.0
    }
}

impl From<Vec<Detection>> for DetectionResult {
    fn from(detections: Vec<Detection>) -> Self {
        Self(detections)
    }
}
