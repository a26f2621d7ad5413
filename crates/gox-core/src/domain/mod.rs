//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (filesystem, child processes, etc.).
//!
//! # Structure
//!
//! - `server` - Remote server descriptors and their protocol tags
//! - `status` - The proxy supervisor's externally visible state

mod server;
mod status;

pub use server::{DEFAULT_NETWORK, Protocol, ServerDescriptor, ValidationError};
pub use status::ProxyStatus;
