//! Single-threaded hosting loop
//!
//! Messages from other threads (the device watcher) arrive over an unbounded
//! channel and are dispatched on the loop thread. Once the inbound queue is
//! drained the loop raises an idle notification, which runs the scheduler's
//! pending actions. One notification is also raised when the loop starts.
//!
//! Runs on a tokio `current_thread` runtime; nothing here is `Send`.

use color_eyre::eyre::{Context, Result};
use std::cell::Cell;
use std::rc::Rc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{AppEvent, EventBus};
use crate::scheduler::IdleScheduler;

/// Work posted to the loop from any thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMessage {
    DefaultDeviceChanged,
    ToggleRequested,
    Exit,
}

/// Cloneable exit switch for the loop
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    exit: Rc<Cell<bool>>,
}

impl LoopControl {
    /// Ask the loop to stop after the current message
    pub fn exit(&self) {
        self.exit.set(true);
    }

    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit.get()
    }
}

pub struct EventLoop {
    tx: mpsc::UnboundedSender<LoopMessage>,
    rx: mpsc::UnboundedReceiver<LoopMessage>,
    scheduler: IdleScheduler,
    bus: EventBus,
    control: LoopControl,
}

impl EventLoop {
    #[must_use]
    pub fn new(scheduler: IdleScheduler, bus: EventBus, control: LoopControl) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            scheduler,
            bus,
            control,
        }
    }

    /// Sender for posting messages from other threads
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<LoopMessage> {
        self.tx.clone()
    }

    fn dispatch(&self, message: LoopMessage) {
        debug!("Loop message: {:?}", message);
        match message {
            LoopMessage::DefaultDeviceChanged => {
                self.bus.emit(AppEvent::DefaultDeviceChanged);
            }
            LoopMessage::ToggleRequested => {
                self.bus.emit(AppEvent::ToggleRequested);
            }
            LoopMessage::Exit => self.control.exit(),
        }
    }

    /// Dispatch `first` plus everything already queued, then go idle
    ///
    /// Returns `false` once exit has been requested; no idle notification is
    /// raised in that case.
    pub fn turn(&mut self, first: Option<LoopMessage>) -> bool {
        if let Some(message) = first {
            self.dispatch(message);
        }
        while !self.control.exit_requested() {
            match self.rx.try_recv() {
                Ok(message) => self.dispatch(message),
                Err(_) => break,
            }
        }
        if self.control.exit_requested() {
            return false;
        }
        self.scheduler.on_idle_notification();
        !self.control.exit_requested()
    }

    /// Run until exit is requested by a message, `LoopControl::exit`, Ctrl-C or SIGTERM
    ///
    /// `SIGUSR1` is delivered as [`LoopMessage::ToggleRequested`]. Idle actions
    /// still queued at exit are discarded.
    ///
    /// # Errors
    /// Returns an error if signal handlers cannot be installed.
    pub async fn run(&mut self) -> Result<()> {
        let mut terminate =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        let mut toggle =
            signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;

        let mut running = self.turn(None);
        while running {
            let next = tokio::select! {
                message = self.rx.recv() => match message {
                    Some(message) => Some(message),
                    None => {
                        info!("Loop channel closed");
                        Some(LoopMessage::Exit)
                    }
                },
                _ = toggle.recv() => Some(LoopMessage::ToggleRequested),
                _ = terminate.recv() => {
                    info!("Received SIGTERM");
                    Some(LoopMessage::Exit)
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C");
                    Some(LoopMessage::Exit)
                }
            };
            running = self.turn(next);
        }

        let discarded = self.scheduler.discard_pending();
        if discarded > 0 {
            debug!("Discarded {} idle action(s) at exit", discarded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn setup() -> (EventLoop, IdleScheduler, EventBus, LoopControl) {
        let scheduler = IdleScheduler::new();
        let bus = EventBus::new();
        let control = LoopControl::default();
        let event_loop = EventLoop::new(scheduler.clone(), bus.clone(), control.clone());
        (event_loop, scheduler, bus, control)
    }

    #[test]
    fn test_first_turn_raises_idle() {
        let (mut event_loop, scheduler, _bus, _control) = setup();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        scheduler.schedule_on_next_idle(move || {
            flag.set(true);
            Ok(())
        });

        assert!(event_loop.turn(None));
        assert!(ran.get());
    }

    #[test]
    fn test_messages_dispatch_before_idle() {
        let (mut event_loop, scheduler, bus, _control) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));

        let bus_log = Rc::clone(&log);
        bus.subscribe(AppEvent::DefaultDeviceChanged, move |_| {
            bus_log.borrow_mut().push("changed");
        });
        let idle_log = Rc::clone(&log);
        scheduler.schedule_on_next_idle(move || {
            idle_log.borrow_mut().push("idle");
            Ok(())
        });

        let tx = event_loop.sender();
        tx.send(LoopMessage::DefaultDeviceChanged).unwrap();
        tx.send(LoopMessage::DefaultDeviceChanged).unwrap();

        assert!(event_loop.turn(None));
        assert_eq!(*log.borrow(), vec!["changed", "changed", "idle"]);
    }

    #[test]
    fn test_exit_message_skips_idle() {
        let (mut event_loop, scheduler, _bus, control) = setup();
        scheduler.schedule_on_next_idle(|| Ok(()));

        assert!(!event_loop.turn(Some(LoopMessage::Exit)));
        assert!(control.exit_requested());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_idle_action_can_stop_loop() {
        let (mut event_loop, scheduler, _bus, control) = setup();
        let stopper = control.clone();
        scheduler.schedule_on_next_idle(move || {
            stopper.exit();
            Ok(())
        });

        assert!(!event_loop.turn(None));
    }

    #[test]
    fn test_run_exits_and_discards_pending() {
        let (mut event_loop, scheduler, _bus, _control) = setup();
        let handle = scheduler.clone();
        let tx = event_loop.sender();
        scheduler.schedule_on_next_idle(move || {
            handle.schedule_on_next_idle(|| Ok(()));
            tx.send(LoopMessage::Exit).unwrap();
            Ok(())
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(event_loop.run()).unwrap();

        assert_eq!(scheduler.pending(), 0);
    }
}
