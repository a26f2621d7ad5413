//! Tracing subscriber setup for the `gox` binary.
//!
//! Filter priority: `RUST_LOG` > `--verbose` > `log.level` from settings.
//! Output goes to stderr and to a daily rolling file in the log directory.

use std::path::Path;

use gox_core::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Prefix of the rolling log files; the appender adds a `.YYYY-MM-DD` suffix.
pub const LOG_FILE_PREFIX: &str = "gox.log";

/// Default filter directive, or `None` when logging is switched off.
pub fn default_directive(settings: &LogSettings, verbose: bool) -> Option<String> {
    if verbose {
        Some("debug".to_string())
    } else if settings.enabled {
        Some(settings.level.clone())
    } else {
        None
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must live until exit.
pub fn init(settings: &LogSettings, verbose: bool, log_dir: &Path) -> Option<WorkerGuard> {
    let directive = default_directive(settings, verbose)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // No ANSI colors in files
                .compact();
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Failed to create log directory {}: {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    guard
}
