//! Logs command handler.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::logging::LOG_FILE_PREFIX;

pub async fn execute(ctx: &CliContext, lines: usize) -> Result<()> {
    let Some(file) = newest_log_file(&ctx.paths.log_dir).await? else {
        println!("No log files in {}", ctx.paths.log_dir.display());
        return Ok(());
    };

    let bytes = fs::read(&file).await.map_err(CliError::from)?;
    let content = String::from_utf8_lossy(&bytes);
    for line in tail(&content, lines) {
        println!("{line}");
    }
    Ok(())
}

/// Most recent rolling log file. Date suffixes sort chronologically by name.
async fn newest_log_file(log_dir: &Path) -> Result<Option<PathBuf>, CliError> {
    let mut entries = match fs::read_dir(log_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log || !entry.file_type().await?.is_file() {
            continue;
        }
        if newest.as_ref().is_none_or(|n| path > *n) {
            newest = Some(path);
        }
    }
    Ok(newest)
}

fn tail(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    lines[lines.len().saturating_sub(count)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), vec!["b", "c"]);
        assert_eq!(tail("a\nb", 10), vec!["a", "b"]);
        assert!(tail("a\nb", 0).is_empty());
    }

    #[tokio::test]
    async fn newest_log_file_picks_latest_day() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "gox.log.2026-10-14",
            "gox.log.2026-10-16",
            "gox.log.2026-10-15",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "line\n").unwrap();
        }

        let newest = newest_log_file(dir.path()).await.unwrap().unwrap();
        assert_eq!(newest, dir.path().join("gox.log.2026-10-16"));
    }

    #[tokio::test]
    async fn missing_log_dir_has_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = newest_log_file(&dir.path().join("logs")).await.unwrap();
        assert!(result.is_none());
    }
}
