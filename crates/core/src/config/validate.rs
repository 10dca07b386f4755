use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - qBittorrent URL is set
/// - Monitor thresholds are usable
/// - Every service has a URL, an API key and a category owned by no other service
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if config.qbittorrent.url.trim().is_empty() {
        return Err(invalid("qbittorrent.url cannot be empty"));
    }

    if config.monitor.consecutive_hits_required < 1 {
        return Err(invalid("monitor.consecutive_hits_required must be at least 1"));
    }

    if config.monitor.poll_interval_secs == 0 {
        return Err(invalid("monitor.poll_interval_secs cannot be 0"));
    }

    if let Some(speed) = config.monitor.min_download_speed_kbps {
        if !speed.is_finite() || speed < 0.0 {
            return Err(invalid(
                "monitor.min_download_speed_kbps must be a non-negative number",
            ));
        }
    }

    let mut categories = HashSet::new();
    for service in &config.services {
        if service.category.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "service '{}' has an empty category",
                service.name
            )));
        }
        if service.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "service '{}' has an empty url",
                service.name
            )));
        }
        if service.api_key.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "service '{}' has an empty api_key",
                service.name
            )));
        }
        if !categories.insert(service.category.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "category '{}' is assigned to more than one service",
                service.category
            )));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
