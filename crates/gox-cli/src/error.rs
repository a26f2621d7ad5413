//! CLI-specific error types and mappings.
//!
//! Domain errors are folded into [`CliError`] so `main` can pick an exit code.

use gox_core::{PathError, RepositoryError, SettingsError};
use gox_runtime::{ServiceError, SupervisorError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// No server matches the given identifier.
    #[error("{0}")]
    NotFound(String),

    /// Invalid user input (bad name, duplicate, failed validation).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine could not be provisioned, started or stopped.
    #[error("Engine error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow sysexits.h where one fits:
    /// - 2: invalid arguments
    /// - 66: EX_NOINPUT
    /// - 71: EX_OSERR
    /// - 74: EX_IOERR
    /// - 78: EX_CONFIG
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::NotFound(_) => 66,
            Self::Process(_) => 71,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => Self::NotFound(err.to_string()),
            RepositoryError::AlreadyExists(_) | RepositoryError::Validation(_) => {
                Self::Arguments(err.to_string())
            }
            RepositoryError::Storage(msg) | RepositoryError::Serialization(msg) => Self::Io(msg),
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::ConfigWrite(e) => Self::Io(e.to_string()),
            other => Self::Process(other.to_string()),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Registry(e) => e.into(),
            ServiceError::Supervisor(e) => e.into(),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CliError>())
        .map_or(1, CliError::exit_code)
}
