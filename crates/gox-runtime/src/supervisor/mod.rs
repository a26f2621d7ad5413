//! Proxy supervisor for the engine child process.
//!
//! The `ProxySupervisor` owns the engine lifecycle and the authoritative
//! [`ProxyStatus`]. Callers never hold process handles themselves.
//!
//! Key design decisions:
//! - **Operation lock**: `start` and `stop` are serialized by one async mutex,
//!   so a restart is always stop-then-start and never interleaves
//! - **Watcher owns the child**: the `Child` lives in a per-launch task that
//!   reaps it and serves kill requests, so the supervisor never blocks on `wait`
//!   while holding state
//! - **Generations**: each launch gets a fresh number, and a watcher only
//!   touches state while its launch is still the registered one
//! - **Status is the source of truth**: unexpected exits are reported only
//!   through the next `status()` call

mod error;
mod state;
mod watcher;

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use gox_core::{AppPaths, ProxyStatus, ServerDescriptor, Settings};
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::engine::{EngineOptions, synthesize_with, write_config};
use crate::provision::{EngineSource, ProvisionOutcome, ensure_engine};

pub use error::SupervisorError;
use state::{ProcessHandle, SupervisorState};
use watcher::{request_kill, watch_process};

const DEFAULT_LIVENESS_WINDOW: Duration = Duration::from_secs(2);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Engine executable, provisioned on construction.
    pub engine_binary: PathBuf,
    /// Engine document, rewritten on every start.
    pub engine_config: PathBuf,
    pub engine: EngineOptions,
    /// How long a new engine must survive before it counts as running.
    pub liveness_window: Duration,
    /// How often the liveness check looks at the watcher.
    pub poll_interval: Duration,
}

impl SupervisorConfig {
    pub fn new(engine_binary: impl Into<PathBuf>, engine_config: impl Into<PathBuf>) -> Self {
        Self {
            engine_binary: engine_binary.into(),
            engine_config: engine_config.into(),
            engine: EngineOptions::default(),
            liveness_window: DEFAULT_LIVENESS_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Reject timings that would let `start` skip the liveness check.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.liveness_window.is_zero() {
            return Err(SupervisorError::InvalidConfig(
                "liveness window must be non-zero".to_string(),
            ));
        }
        if self.poll_interval.is_zero() || self.poll_interval > self.liveness_window {
            return Err(SupervisorError::InvalidConfig(format!(
                "poll interval must be between 1ns and the liveness window ({:?})",
                self.liveness_window
            )));
        }
        Ok(())
    }

    /// Build from resolved paths and persisted settings.
    pub fn from_paths(paths: &AppPaths, settings: &Settings) -> Self {
        Self {
            engine: EngineOptions::from(&settings.proxy),
            liveness_window: Duration::from_millis(settings.proxy.liveness_window_ms),
            ..Self::new(&paths.engine_binary, &paths.engine_config)
        }
    }
}

/// Supervisor for the proxy engine process.
///
/// # Example
///
/// ```ignore
/// let supervisor = ProxySupervisor::new(config, &EngineSource::Unbundled).await?;
/// supervisor.start(&server).await?;
/// println!("Status: {}", supervisor.status().await);
/// supervisor.stop().await?;
/// ```
pub struct ProxySupervisor {
    config: SupervisorConfig,
    /// Serializes `start` and `stop`.
    ops: Mutex<()>,
    state: Arc<RwLock<SupervisorState>>,
}

impl ProxySupervisor {
    /// Provision the engine binary and create an idle supervisor.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::InvalidConfig`] if the liveness timings are unusable
    /// - [`SupervisorError::Provision`] if the engine cannot be put in place
    pub async fn new(
        config: SupervisorConfig,
        source: &EngineSource,
    ) -> Result<Self, SupervisorError> {
        config.validate()?;

        if let ProvisionOutcome::Extracted { bytes } =
            ensure_engine(&config.engine_binary, source).await?
        {
            info!(path = %config.engine_binary.display(), bytes, "Engine binary provisioned");
        }

        Ok(Self {
            config,
            ops: Mutex::new(()),
            state: Arc::new(RwLock::new(SupervisorState::default())),
        })
    }

    /// Start the engine for `server`, restarting it if one is already running.
    ///
    /// Returns once the engine has survived the liveness window.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::KillFailed`] if a running engine could not be stopped
    /// - [`SupervisorError::ConfigWrite`] if the engine document could not be written
    /// - [`SupervisorError::LaunchFailed`] if the engine did not spawn or exited early;
    ///   the status is then `Error` and `active_server` still names `server`
    pub async fn start(&self, server: &ServerDescriptor) -> Result<(), SupervisorError> {
        let _op = self.ops.lock().await;

        if self.state.read().await.process.is_some() {
            info!("Restarting engine for new server");
            self.stop_locked().await?;
        }

        let generation = {
            let mut state = self.state.write().await;
            state.status = ProxyStatus::Connecting;
            state.active = Some(server.clone());
            state.last_exit = None;
            state.next_generation()
        };

        info!(
            generation,
            server = %server.name,
            protocol = %server.protocol,
            address = %server.address,
            port = server.port,
            "Starting engine"
        );

        let document = synthesize_with(server, &self.config.engine);
        if let Err(e) = write_config(&document, &self.config.engine_config).await {
            self.fail_launch(e.to_string()).await;
            return Err(e.into());
        }

        let child = match Command::new(&self.config.engine_binary)
            .arg("-config")
            .arg(&self.config.engine_config)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let reason = format!(
                    "failed to spawn {}: {e}",
                    self.config.engine_binary.display()
                );
                self.fail_launch(reason.clone()).await;
                return Err(SupervisorError::LaunchFailed { reason });
            }
        };

        let pid = child.id();
        {
            // Register before the watcher can look at state
            let mut state = self.state.write().await;
            let cancel = CancellationToken::new();
            let (kill_tx, kill_rx) = mpsc::channel(1);
            let watcher = tokio::spawn(watch_process(
                Arc::clone(&self.state),
                generation,
                child,
                kill_rx,
                cancel.clone(),
            ));
            state.process = Some(ProcessHandle {
                generation,
                pid,
                cancel,
                kill_tx,
                watcher,
            });
        }

        info!(generation, pid, "Engine launched, waiting for liveness");

        if self.survives_liveness_window(generation).await {
            let mut state = self.state.write().await;
            if state.is_current(generation) {
                state.status = ProxyStatus::Running;
                info!(generation, pid, "Engine running");
                return Ok(());
            }
        }

        let reason = {
            let mut state = self.state.write().await;
            state.status = ProxyStatus::Error;
            state.active = Some(server.clone());
            state
                .last_exit
                .clone()
                .unwrap_or_else(|| "engine exited during startup".to_string())
        };
        warn!(generation, %reason, "Engine exited within liveness window");
        Err(SupervisorError::LaunchFailed {
            reason: format!("engine exited within liveness window ({reason})"),
        })
    }

    /// Stop the engine. A no-op when already stopped.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::KillFailed`] if the OS refused the kill; the
    /// state is then left unchanged.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let _op = self.ops.lock().await;
        self.stop_locked().await
    }

    /// Best-effort stop for application exit.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            warn!("Failed to stop engine on shutdown: {e}");
        }
    }

    /// Current status snapshot.
    pub async fn status(&self) -> ProxyStatus {
        self.state.read().await.status
    }

    /// Server the engine was last started for, while running or failed.
    pub async fn active_server(&self) -> Option<ServerDescriptor> {
        self.state.read().await.active.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.is_running()
    }

    /// OS process id of the current engine, for diagnostics.
    pub async fn pid(&self) -> Option<u32> {
        self.state.read().await.process.as_ref().and_then(|p| p.pid)
    }

    /// How the most recent engine process ended, for diagnostics.
    pub async fn last_exit(&self) -> Option<String> {
        self.state.read().await.last_exit.clone()
    }

    /// Stop with the operation lock already held.
    async fn stop_locked(&self) -> Result<(), SupervisorError> {
        // Taking the handle out first turns the watcher's own exit handling
        // into a no-op.
        let handle = {
            let mut state = self.state.write().await;
            let Some(handle) = state.process.take() else {
                if state.status != ProxyStatus::Stopped {
                    info!(status = %state.status, "Clearing engine state");
                }
                state.reset();
                return Ok(());
            };
            handle
        };

        info!(generation = handle.generation, pid = handle.pid, "Stopping engine");
        handle.cancel.cancel();

        if let Err(e) = request_kill(&handle.kill_tx).await {
            if !handle.watcher.is_finished() {
                warn!(pid = handle.pid, "Engine refused to die: {e}");
                self.state.write().await.process = Some(handle);
                return Err(SupervisorError::KillFailed(e));
            }
        }

        if let Err(e) = handle.watcher.await {
            warn!("Engine watcher task failed: {e}");
        }

        let mut state = self.state.write().await;
        state.reset();
        state.last_exit = Some("stopped".to_string());
        info!("Engine stopped");
        Ok(())
    }

    /// Poll until the liveness window passes or the launch is gone.
    async fn survives_liveness_window(&self, generation: u64) -> bool {
        let deadline = Instant::now() + self.config.liveness_window;
        loop {
            if !self.state.read().await.is_current(generation) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            sleep(self.config.poll_interval.min(deadline - now)).await;
        }
    }

    async fn fail_launch(&self, reason: String) {
        let mut state = self.state.write().await;
        state.status = ProxyStatus::Error;
        state.last_exit = Some(reason);
    }
}

impl fmt::Debug for ProxySupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySupervisor")
            .field("engine_binary", &self.config.engine_binary)
            .finish_non_exhaustive()
    }
}
