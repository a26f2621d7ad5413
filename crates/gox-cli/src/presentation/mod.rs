//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no registry or supervisor calls.

pub mod server_display;
pub mod tables;

pub use server_display::display_server;
pub use tables::{mask_secret, or_dash, print_separator, truncate_string};
