//! Command line adapter for gox.
//!
//! `main.rs` parses arguments, calls [`bootstrap`] once and dispatches to
//! [`handlers`]. Nothing outside `bootstrap` constructs stores or supervisors.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Loaded by main.rs before bootstrap
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ConfigCommand, ServerCommand};
pub use error::CliError;
pub use parser::Cli;
