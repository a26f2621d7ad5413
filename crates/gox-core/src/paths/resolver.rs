//! Pure path resolver.
//!
//! Captures every location gox reads or writes in one struct, so adapters
//! agree on paths and `gox paths` can print them.

use std::fmt;
use std::path::{Path, PathBuf};

use super::{PathError, data_root};

#[cfg(target_os = "windows")]
const ENGINE_BINARY_NAME: &str = "xray.exe";

#[cfg(not(target_os = "windows"))]
const ENGINE_BINARY_NAME: &str = "xray";

/// All resolved paths captured in a single struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Root directory for application data.
    pub data_root: PathBuf,
    /// One JSON file per registered server.
    pub servers_dir: PathBuf,
    /// Application settings file.
    pub settings_path: PathBuf,
    /// Directory for application log files.
    pub log_dir: PathBuf,
    /// Provisioned engine executable.
    pub engine_binary: PathBuf,
    /// Engine configuration document, rewritten on every start.
    pub engine_config: PathBuf,
}

impl AppPaths {
    /// Resolve all paths below the data root of the current environment.
    pub fn resolve() -> Result<Self, PathError> {
        Ok(Self::from_root(data_root()?))
    }

    /// Lay out all paths below `root` without touching the filesystem.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_root: root.to_path_buf(),
            servers_dir: root.join("servers"),
            settings_path: root.join("config").join("config.json"),
            log_dir: root.join("logs"),
            engine_binary: root.join("bin").join(ENGINE_BINARY_NAME),
            engine_config: root.join("xray_config.json"),
        }
    }
}

impl fmt::Display for AppPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "servers_dir = {}", self.servers_dir.display())?;
        writeln!(f, "settings_path = {}", self.settings_path.display())?;
        writeln!(f, "log_dir = {}", self.log_dir.display())?;
        writeln!(f, "engine_binary = {}", self.engine_binary.display())?;
        write!(f, "engine_config = {}", self.engine_config.display())
    }
}
