//! Device Directory abstraction
//!
//! The rest of the crate sees playback devices only through [`DeviceDirectory`].
//! [`crate::pipewire::PipeWire`] is the production implementation; tests use
//! in-memory fakes.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::error::DeviceError;

/// An active playback device
///
/// `id` is the stable identity (`PipeWire` node name). `name` is the
/// human-readable display name that fragment matching works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: String,
    pub name: String,
}

impl AudioDevice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Purpose tag for a default device
///
/// Only the multimedia role is ever read or changed; other roles keep
/// whatever default the system gives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Multimedia,
}

/// Active playback devices and the default, as seen at one moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub devices: Vec<AudioDevice>,
    pub default: AudioDevice,
}

/// Callback invoked (from any thread) when the default playback device changes
pub type ChangeCallback = Box<dyn Fn() + Send + 'static>;

/// Read/write view of the system's playback devices
pub trait DeviceDirectory {
    /// All currently active playback devices
    ///
    /// # Errors
    /// Returns an error if the audio subsystem cannot be queried.
    fn active_devices(&self) -> Result<Vec<AudioDevice>, DeviceError>;

    /// The current default playback device for `role`
    ///
    /// # Errors
    /// Returns an error if the audio subsystem cannot be queried or no default exists.
    fn default_device(&self, role: DeviceRole) -> Result<AudioDevice, DeviceError>;

    /// Active devices and the default for `role`, read together
    ///
    /// Override when both can come from one consistent read; this version
    /// queries them separately.
    ///
    /// # Errors
    /// Returns an error if either query fails.
    fn snapshot(&self, role: DeviceRole) -> Result<DeviceSnapshot, DeviceError> {
        Ok(DeviceSnapshot {
            devices: self.active_devices()?,
            default: self.default_device(role)?,
        })
    }

    /// Make `device` the default playback device for `role`
    ///
    /// # Errors
    /// Returns an error if the audio subsystem rejects the change.
    fn set_default_device(&self, device: &AudioDevice, role: DeviceRole)
    -> Result<(), DeviceError>;

    /// Subscribe to default-device changes
    ///
    /// The callback carries no payload; listeners re-query the directory.
    /// Dropping the returned [`DeviceWatch`] unsubscribes.
    ///
    /// # Errors
    /// Returns an error if the subscription cannot be established.
    fn watch_default_device(&self, on_change: ChangeCallback) -> Result<DeviceWatch, DeviceError>;
}

/// Subscription handle for default-device notifications
///
/// Stops the background watcher (if any) when dropped.
#[derive(Debug)]
pub struct DeviceWatch {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl DeviceWatch {
    /// Handle for a watcher thread that polls `stop` between iterations
    #[must_use]
    pub fn from_thread(stop: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self {
            stop,
            thread: Some(thread),
        }
    }

    /// Handle with no backing thread (for directories that push changes themselves)
    #[must_use]
    pub fn detached(stop: Arc<AtomicBool>) -> Self {
        Self { stop, thread: None }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }
}

impl Drop for DeviceWatch {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        // Detached; the watcher exits on its next tick
        drop(self.thread.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_name_not_id() {
        let device = AudioDevice::new("alsa_output.usb.analog-stereo", "USB Headphones");
        assert_eq!(device.to_string(), "USB Headphones");
    }

    #[test]
    fn test_watch_drop_sets_stop_flag() {
        let stop = Arc::new(AtomicBool::new(false));
        let watch = DeviceWatch::detached(Arc::clone(&stop));
        assert!(watch.is_active());
        drop(watch);
        assert!(stop.load(Ordering::Acquire));
    }
}
