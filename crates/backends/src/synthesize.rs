//! Speech synthesis service client

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;

use signbridge_config::EndpointConfig;
use signbridge_core::{AudioEncoding, Capability, Result, SpeechSynthesizer, SynthesizedAudio};

use crate::client::{build_client, ensure_success};
use crate::BackendError;

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
}

pub struct HttpSynthesizer {
    client: Client,
    url: String,
}

impl HttpSynthesizer {
    pub fn new(endpoint: &EndpointConfig) -> std::result::Result<Self, BackendError> {
        Ok(Self {
            client: build_client(endpoint)?,
            url: endpoint.endpoint_url(),
        })
    }

    pub async fn speak(&self, text: &str) -> std::result::Result<SynthesizedAudio, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SynthesizeRequest { text })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let encoding = AudioEncoding::from_content_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let data = response.bytes().await?;

        tracing::debug!(bytes = data.len(), encoding = ?encoding, "Synthesized speech");
        Ok(SynthesizedAudio::new(data, encoding))
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        self.speak(text)
            .await
            .map_err(|e| e.for_capability(Capability::Synthesize))
    }

    fn name(&self) -> &str {
        "http-synthesize"
    }
}
