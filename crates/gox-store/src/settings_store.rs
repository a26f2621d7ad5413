//! JSON file implementation of the `SettingsRepository` trait.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use gox_core::{RepositoryError, Settings, SettingsRepository};

use crate::atomic::write_atomic;

/// Settings stored as a single pretty-printed `config.json`.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsStore {
    /// Load settings, writing the defaults out on first run.
    async fn load(&self) -> Result<Settings, RepositoryError> {
        match fs::read(&self.path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| RepositoryError::Serialization(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let settings = Settings::default();
                self.save(&settings).await?;
                info!(path = %self.path.display(), "Wrote default settings");
                Ok(settings)
            }
            Err(e) => Err(RepositoryError::Storage(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &json)
            .await
            .map_err(|e| RepositoryError::Storage(format!("{}: {e}", self.path.display())))
    }
}
