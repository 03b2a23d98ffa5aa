//! Transcription service client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use signbridge_config::EndpointConfig;
use signbridge_core::{Capability, Result, SpeechTranscriber, TranscribedText};

use crate::client::{build_client, ensure_success};
use crate::BackendError;

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Uploads audio chunks as multipart `file`
pub struct HttpTranscriber {
    client: Client,
    url: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: &EndpointConfig) -> std::result::Result<Self, BackendError> {
        Ok(Self {
            client: build_client(endpoint)?,
            url: endpoint.endpoint_url(),
        })
    }

    pub async fn transcribe_chunk(
        &self,
        audio: Bytes,
    ) -> std::result::Result<TranscribedText, BackendError> {
        let part = Part::bytes(audio.to_vec())
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .map_err(|e| BackendError::Configuration(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let response = ensure_success(response).await?;

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text.map(TranscribedText::new).unwrap_or_default())
    }
}

#[async_trait]
impl SpeechTranscriber for HttpTranscriber {
    async fn transcribe(&self, audio: Bytes) -> Result<TranscribedText> {
        self.transcribe_chunk(audio)
            .await
            .map_err(|e| e.for_capability(Capability::Transcribe))
    }

    fn name(&self) -> &str {
        "http-transcribe"
    }
}
