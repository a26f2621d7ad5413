//! Core domain types and port definitions for gox.
//!
//! This crate holds everything the proxy control plane agrees on, with no
//! process management or storage implementation attached:
//!
//! - [`domain`] - server descriptors, protocol tags and the proxy status value
//! - [`ports`] - registry and settings persistence traits
//! - [`settings`] - application settings with validation
//! - [`paths`] - canonical on-disk locations

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{DEFAULT_NETWORK, Protocol, ProxyStatus, ServerDescriptor, ValidationError};
pub use ports::{RepositoryError, ServerRegistry, SettingsRepository};
pub use settings::{
    DEFAULT_ENGINE_LOG_LEVEL, DEFAULT_HTTP_PORT, DEFAULT_LIVENESS_WINDOW_MS, DEFAULT_SOCKS_PORT,
    LogSettings, ProxySettings, Settings, SettingsError, validate_settings,
};

// Re-export path utilities
pub use paths::{AppPaths, PathError, data_root};
