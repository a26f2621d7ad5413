//! File-per-record implementation of the `ServerRegistry` trait.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use gox_core::{RepositoryError, ServerDescriptor, ServerRegistry};

use crate::atomic::write_atomic;

/// Characters that cannot appear in a record file name.
const RESERVED_CHARS: &[char] = &[' ', '/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Registry storing each server descriptor as `<name>+<address>+<port>.json`.
///
/// Lookups scan the directory, so the file name is only a human-readable
/// label; identity lives in the record's `id` field.
pub struct FileServerRegistry {
    dir: PathBuf,
    /// Serialises mutations so name checks and writes cannot interleave.
    write_lock: Mutex<()>,
}

impl FileServerRegistry {
    /// Create a registry rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, server: &ServerDescriptor) -> PathBuf {
        self.dir.join(record_file_name(server))
    }

    async fn ensure_dir(&self) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_err(&self.dir, &e))
    }

    async fn save(&self, server: &ServerDescriptor) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(server)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let path = self.record_path(server);
        write_atomic(&path, &json)
            .await
            .map_err(|e| storage_err(&path, &e))
    }

    async fn load(path: &Path) -> Result<ServerDescriptor, RepositoryError> {
        let data = fs::read(path).await.map_err(|e| storage_err(path, &e))?;
        serde_json::from_slice(&data).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    fn check_name(
        servers: &[ServerDescriptor],
        name: &str,
        exclude_id: &str,
    ) -> Result<(), RepositoryError> {
        if servers
            .iter()
            .any(|s| s.name == name && s.id != exclude_id)
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "server name '{name}'"
            )));
        }
        Ok(())
    }

    /// Distinct names can sanitise to the same file name.
    fn check_file_clash(
        servers: &[ServerDescriptor],
        server: &ServerDescriptor,
    ) -> Result<(), RepositoryError> {
        let file_name = record_file_name(server);
        if servers
            .iter()
            .any(|s| s.id != server.id && record_file_name(s) == file_name)
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "server record file '{file_name}'"
            )));
        }
        Ok(())
    }
}

/// File name for a record: sanitised name, address and port.
pub(crate) fn record_file_name(server: &ServerDescriptor) -> String {
    let name: String = server
        .name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let address: String = server
        .address
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    format!("{name}+{address}+{}.json", server.port)
}

fn storage_err(path: &Path, e: &io::Error) -> RepositoryError {
    RepositoryError::Storage(format!("{}: {e}", path.display()))
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[async_trait]
impl ServerRegistry for FileServerRegistry {
    async fn list(&self) -> Result<Vec<ServerDescriptor>, RepositoryError> {
        self.ensure_dir().await?;

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| storage_err(&self.dir, &e))?;
        let mut servers = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_err(&self.dir, &e))?
        {
            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if !is_file || !is_record_file(&path) {
                continue;
            }

            // One bad file must not hide the rest of the registry
            match Self::load(&path).await {
                Ok(server) => servers.push(server),
                Err(e) => warn!(path = %path.display(), "Skipping unreadable server record: {e}"),
            }
        }

        servers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(servers)
    }

    async fn get(&self, id: &str) -> Result<ServerDescriptor, RepositoryError> {
        self.list()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("server with id {id}")))
    }

    async fn get_by_name(&self, name: &str) -> Result<ServerDescriptor, RepositoryError> {
        self.list()
            .await?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RepositoryError::NotFound(format!("server named '{name}'")))
    }

    async fn create(
        &self,
        mut server: ServerDescriptor,
    ) -> Result<ServerDescriptor, RepositoryError> {
        server.validate()?;

        let _guard = self.write_lock.lock().await;
        let existing = self.list().await?;
        Self::check_name(&existing, &server.name, "")?;

        if server.id.is_empty() {
            server.id = uuid::Uuid::new_v4().to_string();
        } else if existing.iter().any(|s| s.id == server.id) {
            return Err(RepositoryError::AlreadyExists(format!(
                "server with id {}",
                server.id
            )));
        }

        Self::check_file_clash(&existing, &server)?;

        let now = Utc::now();
        server.created = now;
        server.updated = now;

        self.save(&server).await?;
        debug!(id = %server.id, name = %server.name, "Created server record");
        Ok(server)
    }

    async fn update(
        &self,
        mut server: ServerDescriptor,
    ) -> Result<ServerDescriptor, RepositoryError> {
        server.validate()?;

        let _guard = self.write_lock.lock().await;
        let existing = self.list().await?;
        let old = existing
            .iter()
            .find(|s| s.id == server.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("server with id {}", server.id)))?;
        Self::check_name(&existing, &server.name, &server.id)?;
        Self::check_file_clash(&existing, &server)?;

        // Name, address or port may have changed, and with them the file name
        let old_path = self.record_path(old);
        match fs::remove_file(&old_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(storage_err(&old_path, &e)),
        }

        server.created = old.created;
        server.updated = Utc::now();

        self.save(&server).await?;
        debug!(id = %server.id, name = %server.name, "Updated server record");
        Ok(server)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let server = self.get(id).await?;
        let path = self.record_path(&server);

        fs::remove_file(&path)
            .await
            .map_err(|e| storage_err(&path, &e))?;
        debug!(id = %id, "Deleted server record");
        Ok(())
    }

    async fn validate_name(&self, name: &str, exclude_id: &str) -> Result<(), RepositoryError> {
        let servers = self.list().await?;
        Self::check_name(&servers, name, exclude_id)
    }
}
