//! `PipeWire` integration
//!
//! Implements [`DeviceDirectory`] on top of the `PipeWire` native tools:
//! - `pw-dump`: JSON snapshot of nodes and the `default` metadata object
//! - `pw-metadata`: setting the default audio sink
//!
//! `PipeWire` keeps a single `default.audio.sink`, which backs [`DeviceRole::Multimedia`].
//! Default-device changes are detected by polling that key from a background thread.
//!
//! All required tools must be present in `PATH`.

use serde::Deserialize;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::device::{
    AudioDevice, ChangeCallback, DeviceDirectory, DeviceRole, DeviceSnapshot, DeviceWatch,
};
use crate::error::DeviceError;

// ============================================================================
// Constants
// ============================================================================

/// Default interval between polls of the default sink
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(1000);

const DEFAULT_SINK_KEY: &str = "default.audio.sink";

// ============================================================================
// PipeWire JSON Structures (from pw-dump)
// ============================================================================

/// Top-level `PipeWire` object from `pw-dump` output
#[derive(Debug, Deserialize)]
pub struct PwObject {
    pub id: u32,
    #[serde(rename = "type")]
    pub obj_type: String,
    #[serde(default)]
    pub info: Option<PwInfo>,
    #[serde(default)]
    pub props: Option<PwProps>,
    #[serde(default)]
    pub metadata: Option<Vec<PwMetadataEntry>>,
}

impl PwObject {
    /// Get props from either info.props or top-level props (metadata objects use top-level)
    #[must_use]
    pub fn get_props(&self) -> Option<&PwProps> {
        self.info
            .as_ref()
            .and_then(|i| i.props.as_ref())
            .or(self.props.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct PwInfo {
    #[serde(default)]
    pub props: Option<PwProps>,
}

/// `PipeWire` object properties - uses permissive deserialization
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PwProps {
    #[serde(rename = "node.name")]
    pub node_name: Option<String>,
    #[serde(rename = "node.description")]
    pub node_description: Option<String>,
    #[serde(rename = "node.nick")]
    pub node_nick: Option<String>,
    #[serde(rename = "media.class")]
    pub media_class: Option<String>,
    #[serde(rename = "metadata.name")]
    pub metadata_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PwMetadataEntry {
    pub key: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl PwMetadataEntry {
    /// Extract sink name from metadata value (handles multiple formats)
    #[must_use]
    pub fn get_name(&self) -> Option<String> {
        let value = self.value.as_ref()?;
        if let Some(obj) = value.as_object()
            && let Some(name_val) = obj.get("name")
        {
            return name_val.as_str().map(String::from);
        }
        value.as_str().map(String::from)
    }
}

// ============================================================================
// Snapshot parsing
// ============================================================================

/// Active playback devices (`Audio/Sink` nodes) in a `pw-dump` snapshot
#[must_use]
pub fn playback_devices(objects: &[PwObject]) -> Vec<AudioDevice> {
    objects
        .iter()
        .filter(|obj| obj.obj_type == "PipeWire:Interface:Node")
        .filter_map(|obj| {
            let props = obj.get_props()?;

            if props.media_class.as_deref() != Some("Audio/Sink") {
                return None;
            }

            let id = props.node_name.clone()?;
            let name = props
                .node_description
                .clone()
                .or_else(|| props.node_nick.clone())
                .unwrap_or_else(|| id.clone());

            Some(AudioDevice { id, name })
        })
        .collect()
}

/// Node name of the default sink from the `default` metadata object
#[must_use]
pub fn default_sink_name(objects: &[PwObject]) -> Option<String> {
    objects
        .iter()
        .filter(|obj| obj.obj_type == "PipeWire:Interface:Metadata")
        .filter(|obj| {
            obj.get_props()
                .and_then(|p| p.metadata_name.as_deref())
                == Some("default")
        })
        .filter_map(|obj| obj.metadata.as_ref())
        .flatten()
        .find(|entry| entry.key == DEFAULT_SINK_KEY)
        .and_then(PwMetadataEntry::get_name)
}

/// Resolve the default sink to a device in the same snapshot
///
/// A default that names no active node (stale metadata) still yields a device,
/// using the node name as its display name.
#[must_use]
pub fn default_device_from_objects(objects: &[PwObject]) -> Option<AudioDevice> {
    let default_id = default_sink_name(objects)?;
    let device = playback_devices(objects)
        .into_iter()
        .find(|d| d.id == default_id)
        .unwrap_or_else(|| AudioDevice::new(default_id.clone(), default_id));
    Some(device)
}

/// Active devices and the resolved default from one `pw-dump` snapshot
///
/// # Errors
/// Returns [`DeviceError::NoDefault`] if the snapshot names no default sink.
pub fn snapshot_from_objects(objects: &[PwObject]) -> Result<DeviceSnapshot, DeviceError> {
    let default = default_device_from_objects(objects).ok_or(DeviceError::NoDefault)?;
    Ok(DeviceSnapshot {
        devices: playback_devices(objects),
        default,
    })
}

// ============================================================================
// PipeWire Interface
// ============================================================================

/// `PipeWire`-backed device directory
#[derive(Debug, Clone)]
pub struct PipeWire {
    watch_interval: Duration,
}

impl Default for PipeWire {
    fn default() -> Self {
        Self::new(DEFAULT_WATCH_INTERVAL)
    }
}

impl PipeWire {
    #[must_use]
    pub fn new(watch_interval: Duration) -> Self {
        Self { watch_interval }
    }

    /// Validate that all required `PipeWire` tools are available in `PATH`
    ///
    /// # Errors
    /// Returns [`DeviceError::MissingTools`] listing every tool that is missing.
    pub fn validate_tools() -> Result<(), DeviceError> {
        let missing: Vec<&str> = ["pw-dump", "pw-metadata"]
            .into_iter()
            .filter(|tool| {
                !Command::new(tool)
                    .arg("--version")
                    .output()
                    .is_ok_and(|output| output.status.success())
            })
            .collect();

        if !missing.is_empty() {
            return Err(DeviceError::MissingTools(missing.join(", ")));
        }

        Ok(())
    }

    /// Get all `PipeWire` objects via `pw-dump`
    ///
    /// # Errors
    /// Returns an error if `pw-dump` fails to execute or returns invalid JSON.
    pub fn dump() -> Result<Vec<PwObject>, DeviceError> {
        let output = Command::new("pw-dump")
            .output()
            .map_err(|source| DeviceError::Spawn {
                tool: "pw-dump",
                source,
            })?;

        if !output.status.success() {
            return Err(DeviceError::ToolFailed {
                tool: "pw-dump",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let objects: Vec<PwObject> = serde_json::from_slice(&output.stdout)?;

        trace!("pw-dump returned {} objects", objects.len());
        Ok(objects)
    }

    /// Set the default audio sink via `pw-metadata`
    ///
    /// # Errors
    /// Returns an error if `pw-metadata` cannot be run or rejects the value.
    pub fn set_default_sink(node_name: &str) -> Result<(), DeviceError> {
        // Proper JSON serialization avoids quoting problems in node names
        let value = serde_json::json!({ "name": node_name }).to_string();

        let output = Command::new("pw-metadata")
            .args(["0", DEFAULT_SINK_KEY, &value, "Spa:String:JSON"])
            .output()
            .map_err(|source| DeviceError::Spawn {
                tool: "pw-metadata",
                source,
            })?;

        if !output.status.success() {
            return Err(DeviceError::ToolFailed {
                tool: "pw-metadata",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("Set default sink: {}", node_name);
        Ok(())
    }

    /// Current default sink node name (fresh query)
    fn current_default_name() -> Result<String, DeviceError> {
        default_sink_name(&Self::dump()?).ok_or(DeviceError::NoDefault)
    }
}

impl DeviceDirectory for PipeWire {
    fn active_devices(&self) -> Result<Vec<AudioDevice>, DeviceError> {
        Ok(playback_devices(&Self::dump()?))
    }

    fn default_device(&self, _role: DeviceRole) -> Result<AudioDevice, DeviceError> {
        default_device_from_objects(&Self::dump()?).ok_or(DeviceError::NoDefault)
    }

    fn snapshot(&self, _role: DeviceRole) -> Result<DeviceSnapshot, DeviceError> {
        snapshot_from_objects(&Self::dump()?)
    }

    fn set_default_device(
        &self,
        device: &AudioDevice,
        _role: DeviceRole,
    ) -> Result<(), DeviceError> {
        Self::set_default_sink(&device.id)
    }

    fn watch_default_device(&self, on_change: ChangeCallback) -> Result<DeviceWatch, DeviceError> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let interval = self.watch_interval;

        // Baseline taken before spawning so a change racing startup is still seen
        let mut last = Self::current_default_name().ok();

        let handle = std::thread::Builder::new()
            .name("default-sink-watch".to_string())
            .spawn(move || {
                while !thread_stop.load(Ordering::Acquire) {
                    std::thread::sleep(interval);
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }

                    match Self::current_default_name() {
                        Ok(name) => {
                            if last.as_deref() != Some(name.as_str()) {
                                debug!("Default sink changed: {:?} → {}", last, name);
                                last = Some(name);
                                on_change();
                            }
                        }
                        Err(e) => {
                            // Transient while PipeWire restarts; keep polling
                            warn!("Default sink poll failed: {}", e);
                        }
                    }
                }
                debug!("Default sink watcher stopped");
            })
            .map_err(DeviceError::Watch)?;

        Ok(DeviceWatch::from_thread(stop, handle))
    }
}
