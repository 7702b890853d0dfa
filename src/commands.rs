//! One-shot commands
//!
//! - switch mode: toggle and exit
//! - `--list-devices`: show playback devices and how they match the fragments

use color_eyre::eyre::Result;
use crossterm::style::Stylize;
use serde::Serialize;
use tracing::{error, info};

use crate::device::{AudioDevice, DeviceDirectory, DeviceRole};
use crate::invocation::InvocationArgs;
use crate::style::SwitcherStyle;
use crate::toggle::{NoMatch, ToggleOutcome, normalize, toggle_default_playback_device};

/// Toggle between the configured endpoints and report nothing distinct
///
/// Toggled, no match and device query failure all return `Ok`; only the
/// last is logged as an error.
///
/// # Errors
/// Returns a usage error if `headphones` or `speakers` is missing.
pub fn switch_device(directory: &dyn DeviceDirectory, args: &InvocationArgs) -> Result<()> {
    let (headphones, speakers) = args.toggle_targets()?;

    match toggle_default_playback_device(directory, headphones, speakers) {
        Ok(ToggleOutcome::Toggled(device)) => {
            info!("Switched default playback device to '{}'", device);
        }
        Ok(ToggleOutcome::NoMatch(NoMatch::CurrentUnrecognized { current })) => {
            info!(
                "Current default '{}' is neither '{}' nor '{}'; nothing to do",
                current, headphones, speakers
            );
        }
        Ok(ToggleOutcome::NoMatch(NoMatch::TargetUnavailable { wanted })) => {
            info!("No active playback device matches '{}'; nothing to do", wanted);
        }
        Err(e) => error!("Could not switch playback device: {}", e),
    }

    Ok(())
}

/// Which configured endpoint a device's normalized name matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Headphones,
    Speakers,
}

#[derive(Debug, Serialize)]
pub struct DeviceJson {
    pub id: String,
    pub name: String,
    pub normalized: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
}

#[derive(Debug, Serialize)]
pub struct ListDevicesJson {
    pub devices: Vec<DeviceJson>,
    pub current_default: Option<String>,
}

fn endpoint_for(device: &AudioDevice, args: &InvocationArgs) -> Option<Endpoint> {
    let normalized = normalize(&device.name);
    if args.headphones().is_some_and(|h| normalize(h) == normalized) {
        Some(Endpoint::Headphones)
    } else if args.speakers().is_some_and(|s| normalize(s) == normalized) {
        Some(Endpoint::Speakers)
    } else {
        None
    }
}

/// Build the device listing
///
/// # Errors
/// Returns an error if the active devices cannot be queried. A missing default
/// is reported as `current_default: None`.
pub fn device_listing(
    directory: &dyn DeviceDirectory,
    args: &InvocationArgs,
) -> Result<ListDevicesJson> {
    let devices = directory.active_devices()?;
    let current = directory.default_device(DeviceRole::Multimedia).ok();

    Ok(ListDevicesJson {
        devices: devices
            .iter()
            .map(|d| DeviceJson {
                id: d.id.clone(),
                name: d.name.clone(),
                normalized: normalize(&d.name),
                is_default: current.as_ref().is_some_and(|c| c.id == d.id),
                endpoint: endpoint_for(d, args),
            })
            .collect(),
        current_default: current.map(|c| c.name),
    })
}

/// Print active playback devices
///
/// # Errors
/// Returns an error if the device query or JSON serialization fails.
pub fn list_devices(
    directory: &dyn DeviceDirectory,
    args: &InvocationArgs,
    json_output: bool,
) -> Result<()> {
    let listing = device_listing(directory, args)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}", "PLAYBACK DEVICES:".header());
    println!("{}", "-".repeat(17));
    if listing.devices.is_empty() {
        println!("  {}", "(none)".dim());
    }
    for device in &listing.devices {
        let marker = if device.is_default {
            "* ".success().to_string()
        } else {
            "  ".to_string()
        };
        let endpoint = match device.endpoint {
            Some(Endpoint::Headphones) => format!(" [{}]", "headphones".warning()),
            Some(Endpoint::Speakers) => format!(" [{}]", "speakers".warning()),
            None => String::new(),
        };
        println!("{}{}{}", marker, device.name.as_str().bold(), endpoint);
        println!(
            "    {} {}",
            device.id.as_str().dim(),
            device.normalized.as_str().technical()
        );
    }
    println!("\n  {} = current default", "*".dim());

    Ok(())
}
