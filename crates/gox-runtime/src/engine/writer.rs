//! Engine config writer.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::document::EngineConfig;

/// Failed to persist the engine document.
#[derive(Debug, Error)]
#[error("Failed to write engine config {}: {source}", path.display())]
pub struct ConfigWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Canonical text form: JSON with two-space indentation.
pub fn to_json(config: &EngineConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(config)
}

/// Write `config` to `path` atomically.
///
/// # Atomicity
/// 1. Write and `fsync` `<path>.tmp`
/// 2. Rename over `path`, so the engine never reads a partial document
pub async fn write_config(config: &EngineConfig, path: &Path) -> Result<(), ConfigWriteError> {
    let fail = |source| ConfigWriteError {
        path: path.to_path_buf(),
        source,
    };

    let json = to_json(config).map_err(|e| fail(io::Error::from(e)))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let temp = temp_path(path);
    if let Err(e) = write_synced(&temp, json.as_bytes()).await {
        let _ = fs::remove_file(&temp).await;
        return Err(fail(e));
    }
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(fail(e));
    }

    debug!(path = %path.display(), bytes = json.len(), "Wrote engine config");
    Ok(())
}

async fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
