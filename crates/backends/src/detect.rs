//! Detection service client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use signbridge_config::EndpointConfig;
use signbridge_core::{Capability, Detection, DetectionResult, Detector, Result};

use crate::client::{build_client, ensure_success};
use crate::BackendError;

/// The service answers either `{"predictions": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetectResponse {
    Wrapped { predictions: Vec<Detection> },
    Bare(Vec<Detection>),
}

impl From<DetectResponse> for DetectionResult {
    fn from(response: DetectResponse) -> Self {
        match response {
            DetectResponse::Wrapped { predictions } => DetectionResult::new(predictions),
            DetectResponse::Bare(predictions) => DetectionResult::new(predictions),
        }
    }
}

/// Posts frames as multipart `file` uploads
pub struct HttpDetector {
    client: Client,
    url: String,
}

impl HttpDetector {
    pub fn new(endpoint: &EndpointConfig) -> std::result::Result<Self, BackendError> {
        Ok(Self {
            client: build_client(endpoint)?,
            url: endpoint.endpoint_url(),
        })
    }

    pub async fn predict(&self, image: Bytes) -> std::result::Result<DetectionResult, BackendError> {
        let part = Part::bytes(image.to_vec())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| BackendError::Configuration(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let response = ensure_success(response).await?;

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(DetectionResult::from(parsed).normalized())
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, image: Bytes) -> Result<DetectionResult> {
        self.predict(image)
            .await
            .map_err(|e| e.for_capability(Capability::Detect))
    }

    fn name(&self) -> &str {
        "http-detect"
    }
}
