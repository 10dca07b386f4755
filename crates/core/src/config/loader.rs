use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Plain environment names accepted alongside `UNSTALL_*` overrides.
const LEGACY_ENV_KEYS: [&str; 4] = [
    "QBITTORRENT_URL",
    "QBITTORRENT_USERNAME",
    "QBITTORRENT_PASSWORD",
    "DOWNLOAD_SPEED_CUTOFF",
];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(legacy_env())
        .merge(Env::prefixed("UNSTALL_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Legacy variables, skipping blank ones: `DOWNLOAD_SPEED_CUTOFF=` means no speed floor.
fn legacy_env() -> Env {
    let present: Vec<&str> = LEGACY_ENV_KEYS
        .iter()
        .copied()
        .filter(|key| std::env::var(key).is_ok_and(|v| !v.trim().is_empty()))
        .collect();

    Env::raw().only(&present).map(|key| {
        match key.as_str().to_ascii_uppercase().as_str() {
            "QBITTORRENT_URL" => "qbittorrent.url".into(),
            "QBITTORRENT_USERNAME" => "qbittorrent.username".into(),
            "QBITTORRENT_PASSWORD" => "qbittorrent.password".into(),
            "DOWNLOAD_SPEED_CUTOFF" => "monitor.min_download_speed_kbps".into(),
            other => other.to_ascii_lowercase().into(),
        }
    })
}
