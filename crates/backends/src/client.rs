//! Shared HTTP plumbing

use reqwest::{Client, Response};
use std::time::Duration;

use signbridge_config::EndpointConfig;

use crate::BackendError;

pub(crate) fn build_client(endpoint: &EndpointConfig) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(Duration::from_millis(endpoint.timeout_ms))
        .build()
        .map_err(|e| BackendError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into `BackendError::Status`
pub(crate) async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}
