//! Server registry trait definition.
//!
//! This port defines the interface for server descriptor persistence.
//! Implementations must handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::ServerDescriptor;

/// Registry of remote server descriptors keyed by identity.
///
/// # Design Rules
///
/// - Names are unique within the registry; `create` and `update` enforce it
/// - Descriptors are returned by value; callers hold snapshots, not live records
#[async_trait]
pub trait ServerRegistry: Send + Sync {
    /// List all descriptors in the registry.
    async fn list(&self) -> Result<Vec<ServerDescriptor>, RepositoryError>;

    /// Get a descriptor by its identity.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if no such server exists.
    async fn get(&self, id: &str) -> Result<ServerDescriptor, RepositoryError>;

    /// Get a descriptor by its display name.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if no server has that name.
    async fn get_by_name(&self, name: &str) -> Result<ServerDescriptor, RepositoryError>;

    /// Persist a new descriptor.
    ///
    /// Assigns an identity when the descriptor has none and stamps both
    /// timestamps. Returns the stored record.
    async fn create(&self, server: ServerDescriptor) -> Result<ServerDescriptor, RepositoryError>;

    /// Replace an existing descriptor, preserving its creation time.
    async fn update(&self, server: ServerDescriptor) -> Result<ServerDescriptor, RepositoryError>;

    /// Delete a descriptor by its identity.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Check that `name` is free, ignoring the record with id `exclude_id`.
    ///
    /// Returns `Err(RepositoryError::AlreadyExists)` on a clash.
    async fn validate_name(&self, name: &str, exclude_id: &str) -> Result<(), RepositoryError>;
}
