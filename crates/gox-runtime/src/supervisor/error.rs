use std::io;

use thiserror::Error;

use crate::engine::ConfigWriteError;
use crate::provision::ProvisionError;

/// Error from supervisor operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The engine binary could not be provisioned. Fatal at construction.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// The supervisor configuration cannot confirm a launch.
    #[error("Invalid supervisor configuration: {0}")]
    InvalidConfig(String),

    /// The engine document could not be written; the start was aborted.
    #[error(transparent)]
    ConfigWrite(#[from] ConfigWriteError),

    /// The engine did not spawn, or exited inside the liveness window.
    #[error("Engine failed to start: {reason}")]
    LaunchFailed { reason: String },

    /// The OS refused to terminate the engine process.
    #[error("Failed to kill engine process: {0}")]
    KillFailed(#[source] io::Error),
}
