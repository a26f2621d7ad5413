//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that resolve input, call a port or the connection
//!   service, and format output for the terminal

pub mod config;
pub mod connect;
pub mod logs;
pub mod paths;
pub mod render;
pub mod servers;

use anyhow::Result;
use gox_core::ServerDescriptor;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Find a server by ID, falling back to its display name.
pub(crate) async fn resolve_server(ctx: &CliContext, identifier: &str) -> Result<ServerDescriptor> {
    match ctx.registry().get(identifier).await {
        Ok(server) => Ok(server),
        Err(e) if e.is_not_found() => match ctx.registry().get_by_name(identifier).await {
            Ok(server) => Ok(server),
            Err(e) if e.is_not_found() => Err(CliError::NotFound(format!(
                "No server found matching '{identifier}'. Use 'gox servers list' to see registered servers."
            ))
            .into()),
            Err(e) => Err(CliError::from(e).into()),
        },
        Err(e) => Err(CliError::from(e).into()),
    }
}
