//! Proxy supervisor status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally visible state of the proxy supervisor.
///
/// `Connecting` only exists while a start is in flight. `Error` is sticky
/// until the next start or stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyStatus {
    #[default]
    Stopped,
    Connecting,
    Running,
    Error,
}

impl ProxyStatus {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ProxyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Connecting => write!(f, "connecting"),
            Self::Running => write!(f, "running"),
            Self::Error => write!(f, "error"),
        }
    }
}
