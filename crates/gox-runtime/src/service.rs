//! Connection service: registry lookup in front of the supervisor.

use std::sync::Arc;

use gox_core::{ProxyStatus, RepositoryError, ServerDescriptor, ServerRegistry};
use thiserror::Error;
use tracing::info;

use crate::supervisor::{ProxySupervisor, SupervisorError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RepositoryError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Connects to registered servers by id.
pub struct ConnectionService {
    registry: Arc<dyn ServerRegistry>,
    supervisor: Arc<ProxySupervisor>,
}

impl ConnectionService {
    pub fn new(registry: Arc<dyn ServerRegistry>, supervisor: Arc<ProxySupervisor>) -> Self {
        Self {
            registry,
            supervisor,
        }
    }

    /// Look up `id` and start the engine for it.
    ///
    /// An unknown id fails before any file or process is touched.
    pub async fn connect(&self, id: &str) -> Result<ServerDescriptor, ServiceError> {
        let server = self.registry.get(id).await?;
        info!(id, server = %server.name, "Connecting");
        self.supervisor.start(&server).await?;
        Ok(server)
    }

    pub async fn disconnect(&self) -> Result<(), ServiceError> {
        self.supervisor.stop().await?;
        Ok(())
    }

    pub async fn status(&self) -> ProxyStatus {
        self.supervisor.status().await
    }

    pub async fn active_server(&self) -> Option<ServerDescriptor> {
        self.supervisor.active_server().await
    }

    pub fn supervisor(&self) -> &Arc<ProxySupervisor> {
        &self.supervisor
    }
}
