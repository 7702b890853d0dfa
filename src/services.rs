//! Startup services for interactive mode
//!
//! | priority | service             |
//! |----------|---------------------|
//! | 0        | `pipewire-tools`    |
//! | 10       | `device-watch`      |
//! | 20       | `notification-icon` |
//! | 30       | `service-ready`     |

use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::device::{DeviceDirectory, DeviceWatch};
use crate::error::DeviceError;
use crate::event_loop::LoopMessage;
use crate::events::{AppEvent, EventBus};
use crate::invocation::InvocationArgs;
use crate::notification::send_notification;
use crate::presentation::TrayPresenter;
use crate::startup::StartupService;
use crate::toggle::{ToggleOutcome, toggle_default_playback_device};

/// Holds the default-device subscription for the rest of the process
pub type WatchSlot = Rc<RefCell<Option<DeviceWatch>>>;

/// Fails startup when the audio tooling is unavailable
pub struct ToolCheckService {
    check: fn() -> Result<(), DeviceError>,
}

impl ToolCheckService {
    #[must_use]
    pub fn new(check: fn() -> Result<(), DeviceError>) -> Self {
        Self { check }
    }
}

impl StartupService for ToolCheckService {
    fn name(&self) -> &str {
        "pipewire-tools"
    }

    fn startup(&mut self) -> bool {
        match (self.check)() {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                eprintln!(
                    "{e}\n\
                     \n\
                     Please install the PipeWire utilities package for your distribution:\n\
                     - Arch/Manjaro: pacman -S pipewire\n\
                     - Fedora: dnf install pipewire-utils\n\
                     - Debian/Ubuntu: apt install pipewire-bin"
                );
                false
            }
        }
    }
}

/// Marshals default-device changes onto the loop thread
pub struct DeviceWatchService {
    directory: Rc<dyn DeviceDirectory>,
    sender: mpsc::UnboundedSender<LoopMessage>,
    slot: WatchSlot,
}

impl DeviceWatchService {
    #[must_use]
    pub fn new(
        directory: Rc<dyn DeviceDirectory>,
        sender: mpsc::UnboundedSender<LoopMessage>,
        slot: WatchSlot,
    ) -> Self {
        Self {
            directory,
            sender,
            slot,
        }
    }
}

impl StartupService for DeviceWatchService {
    fn name(&self) -> &str {
        "device-watch"
    }

    fn startup(&mut self) -> bool {
        let sender = self.sender.clone();
        let on_change = Box::new(move || {
            // Closed channel means the loop is gone; nothing left to notify
            let _ = sender.send(LoopMessage::DefaultDeviceChanged);
        });

        match self.directory.watch_default_device(on_change) {
            Ok(watch) => {
                *self.slot.borrow_mut() = Some(watch);
                true
            }
            Err(e) => {
                error!("Could not watch default device: {}", e);
                false
            }
        }
    }
}

/// Binds the indicator and the toggle trigger
pub struct NotificationIconService {
    presenter: Rc<RefCell<TrayPresenter>>,
    directory: Rc<dyn DeviceDirectory>,
    args: Rc<InvocationArgs>,
    bus: EventBus,
}

impl NotificationIconService {
    #[must_use]
    pub fn new(
        presenter: TrayPresenter,
        directory: Rc<dyn DeviceDirectory>,
        args: Rc<InvocationArgs>,
        bus: EventBus,
    ) -> Self {
        Self {
            presenter: Rc::new(RefCell::new(presenter)),
            directory,
            args,
            bus,
        }
    }
}

impl StartupService for NotificationIconService {
    fn name(&self) -> &str {
        "notification-icon"
    }

    fn startup(&mut self) -> bool {
        if self.args.headphones().is_none() {
            warn!("No 'headphones' parameter given; indicator will always show speakers");
        }

        TrayPresenter::attach(&self.presenter, &self.bus);
        self.presenter.borrow_mut().show();

        let directory = Rc::clone(&self.directory);
        let args = Rc::clone(&self.args);
        self.bus.subscribe(AppEvent::ToggleRequested, move |_| {
            let (headphones, speakers) = match args.toggle_targets() {
                Ok(targets) => targets,
                Err(e) => {
                    warn!("Toggle ignored: {}", e);
                    return;
                }
            };
            match toggle_default_playback_device(directory.as_ref(), headphones, speakers) {
                Ok(ToggleOutcome::Toggled(device)) => debug!("Toggled to {}", device),
                Ok(ToggleOutcome::NoMatch(reason)) => {
                    info!("Toggle left device unchanged: {:?}", reason);
                }
                Err(e) => error!("Toggle failed: {}", e),
            }
        });

        true
    }
}

/// Reports readiness to systemd and optionally to the desktop
pub struct ReadyService {
    title: String,
    notify: bool,
}

impl ReadyService {
    #[must_use]
    pub fn new(title: impl Into<String>, notify: bool) -> Self {
        Self {
            title: title.into(),
            notify,
        }
    }
}

impl StartupService for ReadyService {
    fn name(&self) -> &str {
        "service-ready"
    }

    fn startup(&mut self) -> bool {
        // No-op outside systemd (NOTIFY_SOCKET unset)
        if let Err(e) = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]) {
            debug!("sd_notify READY failed: {}", e);
        }

        if self.notify
            && let Err(e) = send_notification(&self.title, "Audio switcher running", None)
        {
            warn!("Could not send startup notification: {:#}", e);
        }

        info!("{} running", self.title);
        true
    }
}
