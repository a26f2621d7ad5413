//! Engine binary provisioning.
//!
//! The engine executable is extracted once to a fixed path before the first
//! launch. Any file already at that path is trusted as-is: there is no hash or
//! version check, so a stale engine is replaced only by deleting it.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Where the engine binary comes from when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    /// Bytes compiled into the calling binary.
    Embedded(&'static [u8]),
    /// A bundled engine file on disk.
    File(PathBuf),
    /// No bundle; the engine must already be installed at the target path.
    Unbundled,
}

/// What [`ensure_engine`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyPresent,
    Extracted { bytes: u64 },
}

/// Errors that can occur while provisioning the engine binary.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "Engine binary not found at {} and no bundle is configured. Install xray there or set proxy.engineBundle.",
        target.display()
    )]
    NotInstalled { target: PathBuf },

    #[error("Failed to check for engine binary at {}: {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read engine bundle {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write engine binary {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to mark {} executable: {source}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Make sure an engine executable exists at `target`.
///
/// Idempotent: once a file exists at `target` it is never touched again.
/// A target that cannot be inspected is an error, not a reason to extract.
pub async fn ensure_engine(
    target: &Path,
    source: &EngineSource,
) -> Result<ProvisionOutcome, ProvisionError> {
    let present = fs::try_exists(target)
        .await
        .map_err(|source| ProvisionError::Inspect {
            path: target.to_path_buf(),
            source,
        })?;
    if present {
        return Ok(ProvisionOutcome::AlreadyPresent);
    }

    let bytes = match source {
        EngineSource::Embedded(bytes) => bytes.to_vec(),
        EngineSource::File(path) => fs::read(path).await.map_err(|source| ProvisionError::Read {
            path: path.clone(),
            source,
        })?,
        EngineSource::Unbundled => {
            return Err(ProvisionError::NotInstalled {
                target: target.to_path_buf(),
            });
        }
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ProvisionError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut temp_name = target.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".part");
    let temp = target.with_file_name(temp_name);

    if let Err(e) = extract(&temp, target, &bytes).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }

    info!(path = %target.display(), bytes = bytes.len(), "Extracted engine binary");
    Ok(ProvisionOutcome::Extracted {
        bytes: bytes.len() as u64,
    })
}

async fn extract(temp: &Path, target: &Path, bytes: &[u8]) -> Result<(), ProvisionError> {
    fs::write(temp, bytes)
        .await
        .map_err(|source| ProvisionError::Write {
            path: temp.to_path_buf(),
            source,
        })?;

    make_executable(temp).await?;

    fs::rename(temp, target)
        .await
        .map_err(|source| ProvisionError::Write {
            path: target.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), ProvisionError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|source| ProvisionError::Permissions {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn make_executable(_path: &Path) -> Result<(), ProvisionError> {
    Ok(())
}
