//! Text refinement service client
//!
//! The refine service wraps an LLM. Depending on the deployment, its
//! `refined` field holds either plain text or the model's JSON envelope
//! `{"text": "...", "metadata": {...}}`, sometimes inside Markdown fences.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use signbridge_config::EndpointConfig;
use signbridge_core::{Capability, RefineMetadata, RefinedResult, Result, TextRefiner};

use crate::client::{build_client, ensure_success};
use crate::BackendError;

#[derive(Serialize)]
struct RefineRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    #[serde(default)]
    refined: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefineEnvelope {
    text: String,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

pub struct HttpRefiner {
    client: Client,
    url: String,
}

impl HttpRefiner {
    pub fn new(endpoint: &EndpointConfig) -> std::result::Result<Self, BackendError> {
        Ok(Self {
            client: build_client(endpoint)?,
            url: endpoint.endpoint_url(),
        })
    }

    pub async fn refine_text(&self, text: &str) -> std::result::Result<RefinedResult, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RefineRequest { text })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let parsed: RefineResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        // A response without `refined` echoes the input
        Ok(match parsed.refined {
            Some(raw) => parse_refined(&raw),
            None => RefinedResult::new(text),
        })
    }
}

#[async_trait]
impl TextRefiner for HttpRefiner {
    async fn refine(&self, text: &str) -> Result<RefinedResult> {
        self.refine_text(text)
            .await
            .map_err(|e| e.for_capability(Capability::Refine))
    }

    fn name(&self) -> &str {
        "http-refine"
    }
}

/// Interpret the `refined` field: JSON envelope if it parses as one, plain text otherwise
pub fn parse_refined(raw: &str) -> RefinedResult {
    let body = strip_code_fences(raw);

    match serde_json::from_str::<RefineEnvelope>(body) {
        Ok(envelope) => {
            let result = RefinedResult::new(envelope.text.trim());
            match envelope.metadata.as_ref().and_then(metadata_from_value) {
                Some(metadata) => result.with_metadata(metadata),
                None => result,
            }
        }
        Err(_) => RefinedResult::new(raw.trim()),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn metadata_from_value(value: &serde_json::Value) -> Option<RefineMetadata> {
    let object = value.as_object()?;
    let word_count = object.get("word_count").and_then(|v| v.as_u64());
    let confidence = object.get("confidence").map(|v| match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    });
    Some(RefineMetadata {
        word_count,
        confidence,
    })
}
