//! Config command handler.

use anyhow::Result;
use gox_core::{Settings, validate_settings};

use crate::bootstrap::CliContext;
use crate::commands::ConfigCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("# {}", ctx.paths.settings_path.display());
            println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
            Ok(())
        }
        ConfigCommand::SetLogLevel { level } => {
            let mut settings = ctx.settings.clone();
            settings.log.level = level;
            save(ctx, &settings).await?;
            println!("✓ Log level set to {}", settings.log.level);
            Ok(())
        }
        ConfigCommand::SetPorts { socks, http } => {
            if socks.is_none() && http.is_none() {
                return Err(CliError::Arguments(
                    "Nothing to change. Pass --socks and/or --http.".to_string(),
                )
                .into());
            }
            let mut settings = ctx.settings.clone();
            if let Some(port) = socks {
                settings.proxy.socks_port = port;
            }
            if let Some(port) = http {
                settings.proxy.http_port = port;
            }
            save(ctx, &settings).await?;
            println!(
                "✓ Listeners set to SOCKS 127.0.0.1:{} and HTTP 127.0.0.1:{}",
                settings.proxy.socks_port, settings.proxy.http_port
            );
            Ok(())
        }
    }
}

async fn save(ctx: &CliContext, settings: &Settings) -> Result<()> {
    validate_settings(settings).map_err(CliError::from)?;
    ctx.settings_repo
        .save(settings)
        .await
        .map_err(CliError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{CliConfig, bootstrap};

    #[tokio::test]
    async fn set_ports_persists_valid_change() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        };
        let ctx = bootstrap(config.clone()).await.unwrap();

        execute(
            &ctx,
            ConfigCommand::SetPorts {
                socks: Some(7890),
                http: None,
            },
        )
        .await
        .unwrap();

        let reloaded = bootstrap(config).await.unwrap();
        assert_eq!(reloaded.settings.proxy.socks_port, 7890);
        assert_eq!(reloaded.settings.proxy.http_port, 1081);
    }

    #[tokio::test]
    async fn port_clash_is_rejected_and_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        };
        let ctx = bootstrap(config.clone()).await.unwrap();

        let result = execute(
            &ctx,
            ConfigCommand::SetPorts {
                socks: Some(1081),
                http: None,
            },
        )
        .await;

        assert!(result.is_err());
        let reloaded = bootstrap(config).await.unwrap();
        assert_eq!(reloaded.settings.proxy.socks_port, 1080);
    }

    #[tokio::test]
    async fn unknown_log_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bootstrap(CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        })
        .await
        .unwrap();

        let err = execute(
            &ctx,
            ConfigCommand::SetLogLevel {
                level: "loud".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 2);
    }
}
