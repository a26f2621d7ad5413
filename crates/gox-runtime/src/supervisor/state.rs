//! Shared supervisor state.

use std::io;

use gox_core::{ProxyStatus, ServerDescriptor};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Ask the watcher to kill its child; it replies with the OS result.
pub(super) type KillRequest = oneshot::Sender<io::Result<()>>;

/// Handle to a launched engine process.
///
/// The `Child` itself lives in the watcher task; this is how the supervisor
/// reaches it.
pub(super) struct ProcessHandle {
    /// Launch this handle belongs to.
    pub generation: u64,
    pub pid: Option<u32>,
    /// Cancelled by `stop` before the kill is sent.
    pub cancel: CancellationToken,
    pub kill_tx: mpsc::Sender<KillRequest>,
    /// Finishes once the child has been reaped.
    pub watcher: JoinHandle<()>,
}

#[derive(Default)]
pub(super) struct SupervisorState {
    pub status: ProxyStatus,
    pub active: Option<ServerDescriptor>,
    pub process: Option<ProcessHandle>,
    /// Last generation handed out. Only grows.
    pub generation: u64,
    pub last_exit: Option<String>,
}

impl SupervisorState {
    /// Whether the process from launch `generation` is still the registered one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.process
            .as_ref()
            .is_some_and(|p| p.generation == generation)
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Back to idle.
    pub fn reset(&mut self) {
        self.status = ProxyStatus::Stopped;
        self.active = None;
        self.process = None;
    }
}
