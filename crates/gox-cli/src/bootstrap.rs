//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Data root and paths (via gox-core)
//! - Server registry and settings store (via gox-store)
//! - Proxy supervisor, built on demand (via gox-runtime)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use gox_core::{
    AppPaths, ServerRegistry, Settings, SettingsRepository, data_root, validate_settings,
};
use gox_runtime::{ConnectionService, EngineSource, ProxySupervisor, SupervisorConfig};
use gox_store::{FileServerRegistry, JsonSettingsStore};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Overrides the data root (`--data-dir`).
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Resolve the paths this invocation should use, creating the data root.
    pub fn resolve_paths(&self) -> Result<AppPaths> {
        let root = match &self.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating data directory {}", dir.display()))?;
                dir.clone()
            }
            None => data_root().map_err(CliError::from)?,
        };
        Ok(AppPaths::from_root(root))
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub paths: AppPaths,
    /// Settings as loaded at startup, already validated.
    pub settings: Settings,
    /// True when this run wrote the default settings file.
    pub created_settings: bool,
    pub registry: Arc<dyn ServerRegistry>,
    pub settings_repo: Arc<dyn SettingsRepository>,
}

impl CliContext {
    pub fn registry(&self) -> &Arc<dyn ServerRegistry> {
        &self.registry
    }

    /// Where the engine binary comes from if it is not installed yet.
    pub fn engine_source(&self) -> EngineSource {
        self.settings
            .proxy
            .engine_bundle
            .clone()
            .map_or(EngineSource::Unbundled, EngineSource::File)
    }

    /// Build the supervisor and the connection service on top of it.
    ///
    /// Provisions the engine binary, so only commands that launch it call this.
    pub async fn connection_service(&self) -> Result<ConnectionService> {
        let config = SupervisorConfig::from_paths(&self.paths, &self.settings);
        let supervisor = ProxySupervisor::new(config, &self.engine_source())
            .await
            .map_err(CliError::from)?;
        Ok(ConnectionService::new(
            Arc::clone(&self.registry),
            Arc::new(supervisor),
        ))
    }
}

/// Bootstrap the CLI application.
///
/// 1. Resolves the data root and all paths
/// 2. Opens the settings store and loads settings (writing defaults on first run)
/// 3. Rejects settings that fail validation, so hand edits cannot reach the supervisor
/// 4. Opens the file-backed server registry
///
/// Runs before the tracing subscriber exists; anything worth logging is
/// reported through the returned context instead.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let paths = config.resolve_paths()?;

    let created_settings = !paths.settings_path.exists();
    let settings_repo: Arc<dyn SettingsRepository> =
        Arc::new(JsonSettingsStore::new(&paths.settings_path));
    let settings = settings_repo.load().await.map_err(CliError::from)?;
    validate_settings(&settings).map_err(|e| {
        CliError::Config(format!("{}: {e}", paths.settings_path.display()))
    })?;

    let registry: Arc<dyn ServerRegistry> = Arc::new(FileServerRegistry::new(&paths.servers_dir));

    Ok(CliContext {
        paths,
        settings,
        created_settings,
        registry,
        settings_repo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_with_data_dir_writes_default_settings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gox");

        let ctx = bootstrap(CliConfig {
            data_dir: Some(root.clone()),
        })
        .await
        .unwrap();

        assert_eq!(ctx.paths.data_root, root);
        assert!(ctx.created_settings);
        assert!(ctx.paths.settings_path.exists());
        assert_eq!(ctx.settings, Settings::default());
        assert!(ctx.registry().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_bootstrap_reuses_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        };

        bootstrap(config.clone()).await.unwrap();
        let ctx = bootstrap(config).await.unwrap();

        assert!(!ctx.created_settings);
    }

    #[tokio::test]
    async fn hand_edited_invalid_settings_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        };
        let settings_path = config.resolve_paths().unwrap().settings_path;
        std::fs::create_dir_all(settings_path.parent().unwrap()).unwrap();

        for bad in [
            r#"{"proxy":{"socksPort":1080,"httpPort":1080}}"#,
            r#"{"proxy":{"livenessWindowMs":0}}"#,
            r#"{"log":{"level":"verbose"}}"#,
        ] {
            std::fs::write(&settings_path, bad).unwrap();

            let err = bootstrap(config.clone()).await.err().unwrap();

            assert_eq!(crate::error::exit_code_for(&err), 78, "{bad}");
            assert!(err.to_string().contains("config.json"), "{err}");
        }
    }

    #[tokio::test]
    async fn engine_source_follows_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = bootstrap(CliConfig {
            data_dir: Some(dir.path().to_path_buf()),
        })
        .await
        .unwrap();

        assert_eq!(ctx.engine_source(), EngineSource::Unbundled);

        ctx.settings.proxy.engine_bundle = Some(PathBuf::from("/opt/xray/xray"));
        assert_eq!(
            ctx.engine_source(),
            EngineSource::File(PathBuf::from("/opt/xray/xray"))
        );
    }
}
