//! Headphones/speakers toggle
//!
//! Device display names are volatile (drivers rename them, users type them by
//! hand), so matching compares normalized names: uppercased with all whitespace
//! removed. Identity is never consulted.

use tracing::{debug, info};

use crate::device::{AudioDevice, DeviceDirectory, DeviceRole, DeviceSnapshot};
use crate::error::DeviceError;

/// Why a toggle left the default device untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatch {
    /// The current default is neither configured endpoint; no candidate search runs
    CurrentUnrecognized { current: String },
    /// The endpoint to switch to is not among the active devices
    TargetUnavailable { wanted: String },
}

/// Result of a successful toggle attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled(AudioDevice),
    NoMatch(NoMatch),
}

/// Normalize a display name or fragment for matching
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Pick the endpoint to switch to, given the current default
///
/// Returns the fragment to look for, or `None` when the current default matches
/// neither endpoint. The headphones branch is checked first.
#[must_use]
pub fn select_target<'a>(current: &str, headphones: &'a str, speakers: &'a str) -> Option<&'a str> {
    let current = normalize(current);
    if current == normalize(headphones) {
        Some(speakers)
    } else if current == normalize(speakers) {
        Some(headphones)
    } else {
        None
    }
}

/// First candidate whose normalized display name equals `fragment`
#[must_use]
pub fn find_device<'a>(devices: &'a [AudioDevice], fragment: &str) -> Option<&'a AudioDevice> {
    let wanted = normalize(fragment);
    devices.iter().find(|d| normalize(&d.name) == wanted)
}

/// Switch the multimedia default between the headphones and speakers endpoints
///
/// Absence of a match is a silent no-op reported as [`ToggleOutcome::NoMatch`].
///
/// # Errors
/// Returns an error if the device directory cannot be queried or refuses the change.
pub fn toggle_default_playback_device(
    directory: &dyn DeviceDirectory,
    headphones: &str,
    speakers: &str,
) -> Result<ToggleOutcome, DeviceError> {
    let DeviceSnapshot {
        devices,
        default: current,
    } = directory.snapshot(DeviceRole::Multimedia)?;

    let Some(wanted) = select_target(&current.name, headphones, speakers) else {
        debug!(
            "Current default '{}' matches neither '{}' nor '{}'",
            current.name, headphones, speakers
        );
        return Ok(ToggleOutcome::NoMatch(NoMatch::CurrentUnrecognized {
            current: current.name,
        }));
    };

    let Some(target) = find_device(&devices, wanted) else {
        debug!("No active device matches '{}'", wanted);
        return Ok(ToggleOutcome::NoMatch(NoMatch::TargetUnavailable {
            wanted: wanted.to_string(),
        }));
    };

    directory.set_default_device(target, DeviceRole::Multimedia)?;
    info!("Default playback device: {} → {}", current.name, target.name);
    Ok(ToggleOutcome::Toggled(target.clone()))
}
