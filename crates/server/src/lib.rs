//! SignBridge Server
//!
//! WebSocket relay between a signing participant and a hearing participant,
//! plus health, metrics and refine-and-speak HTTP endpoints.

pub mod buffer;
pub mod connection;
pub mod coordinator;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod registry;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::AccumulationBuffer;
pub use connection::{
    Connection, ConnectionHandle, ConnectionId, DeliveryError, OutboundFrame, WsConnection,
};
pub use coordinator::RelayCoordinator;
pub use gateway::{decode_inbound, Gateway};
pub use http::create_router;
pub use metrics::init_metrics;
pub use registry::{ConnectionSnapshot, SessionRegistry};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Bind error: {0}")]
    Bind(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<signbridge_config::ConfigError> for ServerError {
    fn from(err: signbridge_config::ConfigError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<signbridge_backends::BackendError> for ServerError {
    fn from(err: signbridge_backends::BackendError) -> Self {
        ServerError::Backend(err.to_string())
    }
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Config(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Backend(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServerError::Bind(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
