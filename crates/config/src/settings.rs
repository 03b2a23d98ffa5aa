//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, server, timeouts, LABEL_SEPARATOR};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Relay server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend capability services
    #[serde(default)]
    pub backends: BackendsConfig,

    /// Relay coordinator behavior
    #[serde(default)]
    pub relay: RelayConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_backends()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let cfg = &self.server;

        if cfg.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        if cfg.inbound_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.inbound_queue_capacity".to_string(),
                message: "Queue capacity must be at least 1".to_string(),
            });
        }

        if cfg.max_message_bytes < server::MIN_MESSAGE_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "server.max_message_bytes".to_string(),
                message: format!(
                    "Must be at least {} bytes, got {}",
                    server::MIN_MESSAGE_BYTES,
                    cfg.max_message_bytes
                ),
            });
        }

        Ok(())
    }

    fn validate_backends(&self) -> Result<(), ConfigError> {
        for (name, endpoint) in self.backends.iter() {
            endpoint.validate(&format!("backends.{}", name))?;
        }
        Ok(())
    }
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = localhost:3000 only)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Bounded queue between a socket reader and its processing loop
    #[serde(default = "default_inbound_queue_capacity")]
    pub inbound_queue_capacity: usize,

    /// Maximum WebSocket message size in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_host() -> String {
    server::HOST.to_string()
}
fn default_port() -> u16 {
    server::PORT
}
fn default_true() -> bool {
    true
}
fn default_inbound_queue_capacity() -> usize {
    server::INBOUND_QUEUE_CAPACITY
}
fn default_max_message_bytes() -> usize {
    server::MAX_MESSAGE_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            inbound_queue_capacity: default_inbound_queue_capacity(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

/// One HTTP capability service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, e.g. `http://ai:8004`
    pub url: String,

    /// Request path appended to `url`
    pub path: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    timeouts::REFINE_MS
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, path: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
            timeout_ms,
        }
    }

    /// Full request URL
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.path)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.url", field),
                message: format!("Must be an http(s) URL, got '{}'", self.url),
            });
        }

        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.path", field),
                message: format!("Must start with '/', got '{}'", self.path),
            });
        }

        if self.timeout_ms == 0 || self.timeout_ms > timeouts::MAX_MS {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.timeout_ms", field),
                message: format!(
                    "Must be between 1 and {} ms, got {}",
                    timeouts::MAX_MS,
                    self.timeout_ms
                ),
            });
        }

        Ok(())
    }
}

/// Backend capability services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default = "default_detect")]
    pub detect: EndpointConfig,

    #[serde(default = "default_refine")]
    pub refine: EndpointConfig,

    #[serde(default = "default_synthesize")]
    pub synthesize: EndpointConfig,

    #[serde(default = "default_transcribe")]
    pub transcribe: EndpointConfig,
}

fn default_detect() -> EndpointConfig {
    EndpointConfig::new(endpoints::DETECT_URL, endpoints::DETECT_PATH, timeouts::DETECT_MS)
}
fn default_refine() -> EndpointConfig {
    EndpointConfig::new(endpoints::REFINE_URL, endpoints::REFINE_PATH, timeouts::REFINE_MS)
}
fn default_synthesize() -> EndpointConfig {
    EndpointConfig::new(
        endpoints::SYNTHESIZE_URL,
        endpoints::SYNTHESIZE_PATH,
        timeouts::SYNTHESIZE_MS,
    )
}
fn default_transcribe() -> EndpointConfig {
    EndpointConfig::new(
        endpoints::TRANSCRIBE_URL,
        endpoints::TRANSCRIBE_PATH,
        timeouts::TRANSCRIBE_MS,
    )
}

impl BackendsConfig {
    /// Endpoints with their config key names
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EndpointConfig)> {
        [
            ("detect", &self.detect),
            ("refine", &self.refine),
            ("synthesize", &self.synthesize),
            ("transcribe", &self.transcribe),
        ]
        .into_iter()
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            detect: default_detect(),
            refine: default_refine(),
            synthesize: default_synthesize(),
            transcribe: default_transcribe(),
        }
    }
}

/// What a commit does when no labels have accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCommitPolicy {
    /// Refine and synthesize the empty text and deliver the result
    #[default]
    Forward,
    /// Ignore the commit
    Skip,
}

/// Relay coordinator behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_label_separator")]
    pub label_separator: String,

    #[serde(default)]
    pub empty_commit: EmptyCommitPolicy,

    /// Send `{"error": ...}` to the originating connection when a backend call fails
    #[serde(default)]
    pub notify_errors: bool,
}

fn default_label_separator() -> String {
    LABEL_SEPARATOR.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            label_separator: default_label_separator(),
            empty_commit: EmptyCommitPolicy::default(),
            notify_errors: false,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` in the working directory and the environment
///
/// Priority: env vars > config/{env} > config/default > built-in defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a specific configuration directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    // Defaults as the base layer so partial overrides of nested tables
    // (e.g. only backends.detect.url) keep the remaining fields
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SIGNBRIDGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
