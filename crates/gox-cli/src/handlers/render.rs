//! Render command handler.
//!
//! Prints the engine document `connect` would write, without writing it.

use anyhow::Result;
use gox_runtime::engine::{EngineOptions, synthesize_with, to_json};

use super::resolve_server;
use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, identifier: &str) -> Result<()> {
    let server = resolve_server(ctx, identifier).await?;
    let options = EngineOptions::from(&ctx.settings.proxy);
    println!("{}", to_json(&synthesize_with(&server, &options))?);
    Ok(())
}
