//! Logging setup
//!
//! - Switch mode and `--foreground`: `tracing_subscriber` to stderr.
//! - Background interactive mode: non-blocking file writer in the XDG state dir.
//!
//! `RUST_LOG` overrides the configured level; otherwise the filter is
//! `audio_switcher=<level>` so only this crate logs at that level.

use color_eyre::eyre::{Context, ContextCompat, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

const LOG_FILE_NAME: &str = "audio-switcher.log";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("audio_switcher={level}")))
}

/// Directory holding the log file (`$XDG_STATE_HOME/audio-switcher`)
///
/// # Errors
/// Returns an error if no state or cache directory can be determined.
pub fn log_dir() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine state directory for logs")?;
    Ok(base.join("audio-switcher"))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; hold it for the process
/// lifetime. It is `None` for stderr output.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init(target: LogTarget, level: &str) -> Result<Option<WorkerGuard>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(level))
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
        LogTarget::File => {
            let dir = log_dir()?;
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter(level))
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_app_specific() {
        let dir = log_dir().unwrap();
        assert!(dir.ends_with("audio-switcher"));
    }
}
