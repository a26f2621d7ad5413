//! Engine configuration and process supervision for gox.
//!
//! # Architecture
//!
//! - [`engine`] - pure synthesis of the engine's JSON document from a
//!   [`ServerDescriptor`](gox_core::ServerDescriptor), plus the on-disk writer
//! - [`provision`] - one-time extraction of the engine executable
//! - [`supervisor`] - [`ProxySupervisor`], the start/stop/status state machine
//!   that owns the engine child process
//! - [`service`] - [`ConnectionService`], registry lookup in front of the supervisor

#![deny(unsafe_code)]

pub mod engine;
pub mod provision;
pub mod service;
pub mod supervisor;

pub use engine::{EngineConfig, EngineOptions, synthesize, synthesize_with, write_config};
pub use provision::{EngineSource, ProvisionError, ProvisionOutcome, ensure_engine};
pub use service::{ConnectionService, ServiceError};
pub use supervisor::{ProxySupervisor, SupervisorConfig, SupervisorError};
