//! File-backed implementations of the gox-core ports.
//!
//! - [`FileServerRegistry`] keeps one JSON document per server descriptor
//! - [`JsonSettingsStore`] keeps the application settings in a single file
//!
//! Both write through a temp file and rename so a crash never leaves a
//! half-written record behind.

mod atomic;
mod server_registry;
mod settings_store;

pub use server_registry::FileServerRegistry;
pub use settings_store::JsonSettingsStore;
