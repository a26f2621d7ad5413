//! Integration tests for the `ProxySupervisor` state machine.
//!
//! The engine is replaced by small shell scripts provisioned through
//! `EngineSource::Embedded`, so no real xray binary is needed.
//!
//! # What is tested
//!
//! - Start reaches `Running` and writes the engine document
//! - Early exit inside the liveness window is `LaunchFailed`
//! - An engine that cannot be spawned is `LaunchFailed`
//! - Crash and clean exit after startup are picked up by the watcher
//! - Restart kills the previous process
//! - Stop is idempotent and clears failure state
//! - Config write failure leaves the supervisor in `Error`

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use gox_core::{ProxyStatus, ServerDescriptor};
use gox_runtime::engine::EngineConfig;
use gox_runtime::{EngineSource, ProxySupervisor, SupervisorConfig, SupervisorError};
use tokio::sync::Mutex;

const LONG_RUNNING: &[u8] = b"#!/bin/sh\nexec sleep 30\n";
const EXITS_IMMEDIATELY: &[u8] = b"#!/bin/sh\nexit 1\n";
const CRASHES_LATER: &[u8] = b"#!/bin/sh\nsleep 1\nexit 3\n";
const EXITS_CLEANLY_LATER: &[u8] = b"#!/bin/sh\nsleep 1\nexit 0\n";

// Exec of a script fails with ETXTBSY while a child forked by another test
// still holds its write descriptor, so these tests run one at a time.
static SERIAL: Mutex<()> = Mutex::const_new(());

// ── Helpers ────────────────────────────────────────────────────────

fn server(name: &str) -> ServerDescriptor {
    let mut server = ServerDescriptor::new(name, "vmess", "1.2.3.4", 443);
    server.id = format!("{name}-id");
    server.uuid = "b831381d-6324-4d53-ad4f-8cda48b30811".to_string();
    server
}

async fn supervisor(dir: &Path, engine: &'static [u8], window: Duration) -> ProxySupervisor {
    let mut config = SupervisorConfig::new(
        dir.join("bin").join("xray"),
        dir.join("xray_config.json"),
    );
    config.liveness_window = window;
    config.poll_interval = Duration::from_millis(20);

    ProxySupervisor::new(config, &EngineSource::Embedded(engine))
        .await
        .unwrap()
}

async fn wait_for_status(supervisor: &ProxySupervisor, expected: ProxyStatus) {
    for _ in 0..100 {
        if supervisor.status().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "status never became {expected}, still {}",
        supervisor.status().await
    );
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn start_reaches_running_and_writes_config() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(300)).await;

    supervisor.start(&server("tokyo")).await.unwrap();

    assert_eq!(supervisor.status().await, ProxyStatus::Running);
    assert_eq!(supervisor.active_server().await.unwrap().name, "tokyo");
    assert!(supervisor.pid().await.is_some());

    let written = std::fs::read_to_string(dir.path().join("xray_config.json")).unwrap();
    let document: EngineConfig = serde_json::from_str(&written).unwrap();
    assert_eq!(document.outbounds[0].tag, "proxy");
    assert_eq!(document.outbounds[0].protocol, "vmess");

    supervisor.stop().await.unwrap();
    assert_eq!(supervisor.status().await, ProxyStatus::Stopped);
    assert!(supervisor.active_server().await.is_none());
    assert!(supervisor.pid().await.is_none());
}

#[tokio::test]
async fn exit_inside_liveness_window_is_launch_failure() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), EXITS_IMMEDIATELY, Duration::from_secs(1)).await;

    let err = supervisor.start(&server("dead")).await.unwrap_err();

    assert!(matches!(err, SupervisorError::LaunchFailed { .. }));
    assert_eq!(supervisor.status().await, ProxyStatus::Error);
    // Kept so the caller can see what was attempted
    assert_eq!(supervisor.active_server().await.unwrap().name, "dead");
    assert!(supervisor.last_exit().await.unwrap().contains("exit status: 1"));

    supervisor.stop().await.unwrap();
    assert_eq!(supervisor.status().await, ProxyStatus::Stopped);
    assert!(supervisor.active_server().await.is_none());
}

#[tokio::test]
async fn missing_binary_is_launch_failure() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(200)).await;
    std::fs::remove_file(dir.path().join("bin").join("xray")).unwrap();

    let err = supervisor.start(&server("gone")).await.unwrap_err();

    let SupervisorError::LaunchFailed { reason } = err else {
        panic!("expected LaunchFailed, got {err:?}");
    };
    assert!(reason.contains("failed to spawn"), "{reason}");
    assert_eq!(supervisor.status().await, ProxyStatus::Error);
    assert_eq!(supervisor.active_server().await.unwrap().name, "gone");
    assert!(supervisor.pid().await.is_none());
}

#[tokio::test]
async fn non_executable_binary_is_launch_failure() {
    use std::os::unix::fs::PermissionsExt;

    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(200)).await;
    std::fs::set_permissions(
        dir.path().join("bin").join("xray"),
        std::fs::Permissions::from_mode(0o644),
    )
    .unwrap();

    let err = supervisor.start(&server("noexec")).await.unwrap_err();

    assert!(matches!(err, SupervisorError::LaunchFailed { .. }));
    assert_eq!(supervisor.status().await, ProxyStatus::Error);
    assert_eq!(supervisor.active_server().await.unwrap().name, "noexec");

    // Stop clears the failed attempt
    supervisor.stop().await.unwrap();
    assert_eq!(supervisor.status().await, ProxyStatus::Stopped);
    assert!(supervisor.active_server().await.is_none());
}

#[tokio::test]
async fn crash_after_startup_is_error() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), CRASHES_LATER, Duration::from_millis(200)).await;

    supervisor.start(&server("flaky")).await.unwrap();
    assert_eq!(supervisor.status().await, ProxyStatus::Running);

    wait_for_status(&supervisor, ProxyStatus::Error).await;
    assert!(supervisor.active_server().await.is_none());
    assert!(supervisor.pid().await.is_none());
    assert!(supervisor.last_exit().await.unwrap().contains("exit status: 3"));
}

#[tokio::test]
async fn clean_exit_after_startup_is_stopped() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor =
        supervisor(dir.path(), EXITS_CLEANLY_LATER, Duration::from_millis(200)).await;

    supervisor.start(&server("short-lived")).await.unwrap();
    wait_for_status(&supervisor, ProxyStatus::Stopped).await;
    assert!(supervisor.active_server().await.is_none());
}

#[tokio::test]
async fn restart_replaces_running_engine() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(200)).await;

    supervisor.start(&server("first")).await.unwrap();
    let first_pid = supervisor.pid().await.unwrap();

    supervisor.start(&server("second")).await.unwrap();
    let second_pid = supervisor.pid().await.unwrap();

    assert_ne!(first_pid, second_pid);
    assert_eq!(supervisor.status().await, ProxyStatus::Running);
    assert_eq!(supervisor.active_server().await.unwrap().name, "second");

    // The old process was killed and reaped
    #[cfg(target_os = "linux")]
    assert!(!Path::new(&format!("/proc/{first_pid}")).exists());

    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn restart_after_launch_failure() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), EXITS_IMMEDIATELY, Duration::from_millis(500)).await;

    assert!(supervisor.start(&server("a")).await.is_err());
    assert!(supervisor.start(&server("b")).await.is_err());

    assert_eq!(supervisor.status().await, ProxyStatus::Error);
    assert_eq!(supervisor.active_server().await.unwrap().name, "b");
}

#[tokio::test]
async fn stop_is_idempotent() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(200)).await;

    supervisor.stop().await.unwrap();
    supervisor.stop().await.unwrap();
    assert_eq!(supervisor.status().await, ProxyStatus::Stopped);
}

#[tokio::test]
async fn config_write_failure_aborts_start() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut config = SupervisorConfig::new(
        dir.path().join("bin").join("xray"),
        blocker.join("xray_config.json"),
    );
    config.liveness_window = Duration::from_millis(200);
    let supervisor = ProxySupervisor::new(config, &EngineSource::Embedded(LONG_RUNNING))
        .await
        .unwrap();

    let err = supervisor.start(&server("nowhere")).await.unwrap_err();

    assert!(matches!(err, SupervisorError::ConfigWrite(_)));
    assert_eq!(supervisor.status().await, ProxyStatus::Error);
    assert!(supervisor.pid().await.is_none());
}

#[tokio::test]
async fn concurrent_status_reads_during_start() {
    let _serial = SERIAL.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let supervisor = std::sync::Arc::new(
        supervisor(dir.path(), LONG_RUNNING, Duration::from_millis(300)).await,
    );

    let starter = {
        let supervisor = std::sync::Arc::clone(&supervisor);
        tokio::spawn(async move { supervisor.start(&server("busy")).await })
    };

    // Status stays readable while start waits out the liveness window
    let mut seen_connecting = false;
    while !starter.is_finished() {
        if supervisor.status().await == ProxyStatus::Connecting {
            seen_connecting = true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    starter.await.unwrap().unwrap();
    assert!(seen_connecting);
    assert_eq!(supervisor.status().await, ProxyStatus::Running);

    supervisor.shutdown().await;
    assert_eq!(supervisor.status().await, ProxyStatus::Stopped);
}
