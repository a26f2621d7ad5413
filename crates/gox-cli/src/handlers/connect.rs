//! Connect command handler.
//!
//! Starts the engine for one server and keeps it up until Ctrl-C or until the
//! engine dies on its own.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use super::resolve_server;
use crate::bootstrap::CliContext;
use crate::error::CliError;

const STATUS_POLL: Duration = Duration::from_millis(500);

pub async fn execute(ctx: &CliContext, identifier: &str) -> Result<()> {
    let server = resolve_server(ctx, identifier).await?;
    let service = ctx.connection_service().await?;

    println!(
        "Connecting to {} ({} {}:{})...",
        server.name, server.protocol, server.address, server.port
    );
    service.connect(&server.id).await.map_err(CliError::from)?;

    let proxy = &ctx.settings.proxy;
    println!("✓ Connected to {}", server.name);
    println!("  SOCKS5 proxy: 127.0.0.1:{}", proxy.socks_port);
    println!("  HTTP proxy:   127.0.0.1:{}", proxy.http_port);
    println!("Press Ctrl-C to disconnect.");

    let mut ticker = tokio::time::interval(STATUS_POLL);
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            _ = ticker.tick() => {
                let status = service.status().await;
                if !status.is_running() {
                    let reason = service
                        .supervisor()
                        .last_exit()
                        .await
                        .unwrap_or_else(|| status.to_string());
                    return Err(CliError::Process(format!(
                        "engine stopped unexpectedly ({reason})"
                    ))
                    .into());
                }
            }
        }
    }

    info!("Ctrl-C received, disconnecting");
    service.disconnect().await.map_err(CliError::from)?;
    println!("✓ Disconnected");
    Ok(())
}
