//! Background task that owns the engine child process.
//!
//! One watcher per launch. It waits for the child to exit, serving kill
//! requests meanwhile, then folds the exit into the shared state unless a
//! newer launch or an explicit stop has already taken over.

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use gox_core::ProxyStatus;
use tokio::process::Child;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{KillRequest, SupervisorState};

pub(super) async fn watch_process(
    state: Arc<RwLock<SupervisorState>>,
    generation: u64,
    mut child: Child,
    mut kill_rx: mpsc::Receiver<KillRequest>,
    cancel: CancellationToken,
) {
    let exit = loop {
        tokio::select! {
            result = child.wait() => break result,
            Some(reply) = kill_rx.recv() => {
                // The requester may have gone away; nothing to report then
                let _ = reply.send(child.start_kill());
            }
        }
    };

    let summary = describe_exit(&exit);
    let mut state = state.write().await;

    if !state.is_current(generation) {
        debug!(generation, %summary, "Engine exit already handled by supervisor");
        return;
    }

    let next = match &exit {
        Ok(status) if status.success() => ProxyStatus::Stopped,
        _ => ProxyStatus::Error,
    };

    if cancel.is_cancelled() {
        info!(generation, %summary, "Engine exited after stop request");
    } else {
        warn!(generation, %summary, "Engine exited unexpectedly");
    }

    state.reset();
    state.status = next;
    state.last_exit = Some(summary);
}

/// Ask the watcher behind `kill_tx` to kill its child.
///
/// A watcher that is gone or drops the reply has already seen the child
/// exit, which counts as success.
pub(super) async fn request_kill(kill_tx: &mpsc::Sender<KillRequest>) -> io::Result<()> {
    let (reply_tx, reply_rx) = oneshot::channel();
    if kill_tx.send(reply_tx).await.is_err() {
        return Ok(());
    }
    reply_rx.await.unwrap_or(Ok(()))
}

fn describe_exit(exit: &io::Result<ExitStatus>) -> String {
    match exit {
        Ok(status) => status.to_string(),
        Err(e) => format!("failed to wait for engine: {e}"),
    }
}
