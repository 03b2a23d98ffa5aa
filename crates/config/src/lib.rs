//! Configuration management for the SignBridge relay
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`SIGNBRIDGE__` prefix, `__` separator)
//!
//! Built-in defaults form the lowest layer, so a file or variable only
//! needs to name what it overrides.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, BackendsConfig, EmptyCommitPolicy, EndpointConfig,
    ObservabilityConfig, RelayConfig, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
