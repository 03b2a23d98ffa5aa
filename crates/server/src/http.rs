//! HTTP Endpoints
//!
//! WebSocket routes for both roles, health, metrics and the direct
//! refine-and-speak endpoint.

use axum::{
    extract::{Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::gateway::Gateway;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    drop(config);

    Router::new()
        .route("/ws/signer", get(Gateway::signer))
        .route("/ws/hearing", get(Gateway::hearing))
        // Paths used by the existing web clients
        .route("/ws/deaf", get(Gateway::signer))
        .route("/ws/normal", get(Gateway::hearing))
        .route("/api/refine-and-tts", post(refine_and_tts))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn localhost_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:3000"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost_cors();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost_cors();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.coordinator.registry().snapshot(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct RefineAndSpeakRequest {
    text: String,
}

/// Refine the given text and return it as synthesized audio
async fn refine_and_tts(
    State(state): State<AppState>,
    Json(request): Json<RefineAndSpeakRequest>,
) -> Result<Response, StatusCode> {
    let (refined, audio) = state
        .coordinator
        .translate(&request.text)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "refine-and-tts failed");
            StatusCode::from(ServerError::Backend(e.to_string()))
        })?;

    tracing::debug!(
        refined = %refined.text,
        bytes = audio.len(),
        "refine-and-tts complete"
    );
    Ok(([(header::CONTENT_TYPE, audio.encoding.mime())], audio.data).into_response())
}
