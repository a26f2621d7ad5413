//! Settings domain types and validation.
//!
//! This module contains the application settings persisted in `config.json`.
//! These are pure domain types with no infrastructure dependencies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local SOCKS listener port the engine binds.
pub const DEFAULT_SOCKS_PORT: u16 = 1080;

/// Local HTTP listener port the engine binds.
pub const DEFAULT_HTTP_PORT: u16 = 1081;

/// Verbosity written into the engine's own `log.loglevel`.
pub const DEFAULT_ENGINE_LOG_LEVEL: &str = "warning";

/// How long a freshly launched engine must stay alive before it counts as running.
pub const DEFAULT_LIVENESS_WINDOW_MS: u64 = 2000;

const MAX_LIVENESS_WINDOW_MS: u64 = 60_000;

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub log: LogSettings,
    pub proxy: ProxySettings,
}

/// Application log configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogSettings {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// When false no subscriber is installed at all.
    pub enabled: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enabled: true,
        }
    }
}

/// Engine and supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxySettings {
    pub socks_port: u16,
    pub http_port: u16,
    pub engine_log_level: String,
    pub liveness_window_ms: u64,
    /// Where to extract the engine binary from on first launch.
    pub engine_bundle: Option<PathBuf>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            socks_port: DEFAULT_SOCKS_PORT,
            http_port: DEFAULT_HTTP_PORT,
            engine_log_level: DEFAULT_ENGINE_LOG_LEVEL.to_string(),
            liveness_window_ms: DEFAULT_LIVENESS_WINDOW_MS,
            engine_bundle: None,
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Listener port cannot be 0")]
    InvalidPort,

    #[error("SOCKS and HTTP listeners cannot share port {0}")]
    PortClash(u16),

    #[error("Liveness window must be between 1 and 60000 ms, got {0}")]
    InvalidLivenessWindow(u64),

    #[error("Unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Validate settings before they are saved or used to build a supervisor.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let proxy = &settings.proxy;

    if proxy.socks_port == 0 || proxy.http_port == 0 {
        return Err(SettingsError::InvalidPort);
    }
    if proxy.socks_port == proxy.http_port {
        return Err(SettingsError::PortClash(proxy.socks_port));
    }
    if proxy.liveness_window_ms == 0 || proxy.liveness_window_ms > MAX_LIVENESS_WINDOW_MS {
        return Err(SettingsError::InvalidLivenessWindow(
            proxy.liveness_window_ms,
        ));
    }

    match settings.log.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(SettingsError::InvalidLogLevel(other.to_string())),
    }
}
