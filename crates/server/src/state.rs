use std::sync::Arc;
use unstall_core::{Config, Monitor, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    monitor: Option<Arc<Monitor>>,
}

impl AppState {
    pub fn new(config: Config, monitor: Option<Arc<Monitor>>) -> Self {
        Self { config, monitor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn monitor(&self) -> Option<&Arc<Monitor>> {
        self.monitor.as_ref()
    }
}
