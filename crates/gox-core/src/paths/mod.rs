//! Path utilities for gox data directories.
//!
//! This module provides the canonical path resolution for all gox components:
//! - Server registry directory
//! - Settings file
//! - Engine binary and engine config file
//! - Log directory
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - `AppPaths::from_root` is pure so tests never touch the real data root

mod error;
mod platform;
mod resolver;

pub use error::PathError;
pub use platform::data_root;
pub use resolver::AppPaths;
