//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;

use signbridge_config::Settings;
use signbridge_core::Capabilities;

use crate::coordinator::RelayCoordinator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    /// The single relay session
    pub coordinator: Arc<RelayCoordinator>,
    /// Present when Prometheus export is enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, capabilities: Capabilities) -> Self {
        let coordinator = RelayCoordinator::new(capabilities, config.relay.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            coordinator: Arc::new(coordinator),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
