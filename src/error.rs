//! Error taxonomy
//!
//! Typed errors for the core. Application-level code wraps these in
//! `color_eyre::eyre::Report` via `?`.
//!
//! "No matching device" is deliberately absent: it is an outcome, see
//! [`crate::toggle::ToggleOutcome`].

use thiserror::Error;

/// Programmer or user errors, surfaced immediately and never recovered
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Invocation token '{0}' is not of the form key=value")]
    MissingSeparator(String),
    #[error("Invocation key '{0}' given more than once")]
    DuplicateKey(String),
    #[error("Parameter '{0}' is required to switch devices (e.g. \"switch=1|headphones=...|speakers=...\")")]
    MissingParameter(&'static str),
}

/// The audio subsystem could not enumerate, report or change devices
///
/// Fatal to the current toggle or indicator refresh, never to the process.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("PipeWire tool '{tool}' not found or failed to start")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },
    #[error("Failed to parse pw-dump JSON")]
    Parse(#[from] serde_json::Error),
    #[error("No default playback device found in PipeWire metadata")]
    NoDefault,
    #[error("Missing required PipeWire tools: {0}")]
    MissingTools(String),
    #[error("Device watcher thread could not be started")]
    Watch(#[source] std::io::Error),
}

/// A startup service reported failure; the pipeline stopped at it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Startup service '{service}' failed")]
pub struct StartupFailure {
    pub service: String,
}
