//! Atomic file replacement using temp file + rename.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

/// Sibling path used while a file is being written.
///
/// The `.tmp` suffix keeps half-written records out of `*.json` scans.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("record"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` atomically, creating the parent directory.
///
/// 1. Write to `<name>.tmp` next to the target
/// 2. Rename over the target (atomic on Unix/macOS)
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    fs::write(&temp, contents).await?;

    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_keeps_directory_and_adds_suffix() {
        let temp = temp_path(Path::new("/data/servers/a+b+1.json"));
        assert_eq!(temp, PathBuf::from("/data/servers/a+b+1.json.tmp"));
    }

    #[tokio::test]
    async fn write_atomic_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }
}
