//! Application lifetime
//!
//! [`Application`] owns the parsed invocation args and the loop-thread
//! plumbing (idle scheduler, event bus, exit switch). Components are handed
//! what they need at construction; there is no service locator.

use color_eyre::eyre::{Context, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, warn};

use crate::error::StartupFailure;
use crate::event_loop::{EventLoop, LoopControl};
use crate::events::EventBus;
use crate::invocation::InvocationArgs;
use crate::scheduler::IdleScheduler;
use crate::startup::StartupPipeline;

pub const TITLE: &str = "Audio Switcher";

pub struct Application {
    title: String,
    executable_path: PathBuf,
    args: Rc<InvocationArgs>,
    scheduler: IdleScheduler,
    bus: EventBus,
    control: LoopControl,
    startup_failure: Rc<RefCell<Option<StartupFailure>>>,
}

impl Application {
    /// # Errors
    /// Returns an error if the running executable's path cannot be determined.
    pub fn new(args: InvocationArgs) -> Result<Self> {
        let executable_path =
            std::env::current_exe().context("Could not determine executable path")?;
        Ok(Self::with_executable_path(args, executable_path))
    }

    #[must_use]
    pub fn with_executable_path(args: InvocationArgs, executable_path: PathBuf) -> Self {
        Self {
            title: TITLE.to_string(),
            executable_path,
            args: Rc::new(args),
            scheduler: IdleScheduler::new(),
            bus: EventBus::new(),
            control: LoopControl::default(),
            startup_failure: Rc::new(RefCell::new(None)),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    #[must_use]
    pub fn args(&self) -> &Rc<InvocationArgs> {
        &self.args
    }

    #[must_use]
    pub fn scheduler(&self) -> &IdleScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn control(&self) -> &LoopControl {
        &self.control
    }

    /// Loop bound to this application's scheduler, bus and exit switch
    #[must_use]
    pub fn event_loop(&self) -> EventLoop {
        EventLoop::new(self.scheduler.clone(), self.bus.clone(), self.control.clone())
    }

    /// Stop the loop and release every listener
    ///
    /// Queued idle actions are discarded, not flushed. Safe to call more than once.
    pub fn shutdown(&self) {
        info!("Shutting down");
        stop_loop(&self.control, &self.scheduler);
        self.bus.clear();
    }

    /// Run `pipeline` on the first idle notification
    ///
    /// Some services need the loop to be live, so nothing runs here. A failing
    /// service shuts the application down.
    pub fn schedule_startup(&self, pipeline: StartupPipeline) {
        let control = self.control.clone();
        let scheduler = self.scheduler.clone();
        let failure_slot = Rc::clone(&self.startup_failure);

        self.scheduler.schedule_on_next_idle(move || {
            if let Err(failure) = pipeline.run() {
                warn!("{}; shutting down", failure);
                *failure_slot.borrow_mut() = Some(failure);
                stop_loop(&control, &scheduler);
            }
            Ok(())
        });
    }

    /// The startup failure that ended the run, if any
    #[must_use]
    pub fn startup_failure(&self) -> Option<StartupFailure> {
        self.startup_failure.borrow().clone()
    }

    /// Run the loop until it is asked to exit, then [`Application::shutdown`]
    ///
    /// # Errors
    /// Returns an error if the loop cannot start, or [`StartupFailure`] if the
    /// startup pipeline aborted.
    pub async fn run_interactive(&self, event_loop: &mut EventLoop) -> Result<()> {
        let result = event_loop.run().await;
        self.shutdown();
        result?;

        if let Some(failure) = self.startup_failure() {
            return Err(failure.into());
        }
        Ok(())
    }
}

fn stop_loop(control: &LoopControl, scheduler: &IdleScheduler) {
    control.exit();
    scheduler.discard_pending();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_loop::LoopMessage;
    use crate::events::AppEvent;
    use crate::startup::StartupService;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Flag {
        name: &'static str,
        ok: bool,
        ran: Rc<Cell<bool>>,
    }

    impl StartupService for Flag {
        fn name(&self) -> &str {
            self.name
        }
        fn startup(&mut self) -> bool {
            self.ran.set(true);
            self.ok
        }
    }

    fn app() -> Application {
        Application::with_executable_path(
            InvocationArgs::parse("headphones=A|speakers=B").unwrap(),
            PathBuf::from("/usr/bin/audio-switcher"),
        )
    }

    #[test]
    fn test_exposes_title_path_and_args() {
        let app = app();
        assert_eq!(app.title(), TITLE);
        assert_eq!(app.executable_path(), Path::new("/usr/bin/audio-switcher"));
        assert_eq!(app.args().headphones(), Some("A"));
    }

    #[test]
    fn test_startup_deferred_until_idle() {
        let app = app();
        let ran = Rc::new(Cell::new(false));
        app.schedule_startup(StartupPipeline::new(vec![(
            0,
            Box::new(Flag {
                name: "only",
                ok: true,
                ran: Rc::clone(&ran),
            }),
        )]));

        assert!(!ran.get());
        let mut event_loop = app.event_loop();
        assert!(event_loop.turn(None));
        assert!(ran.get());
        assert_eq!(app.startup_failure(), None);
    }

    #[test]
    fn test_startup_failure_shuts_down() {
        let app = app();
        let later = Rc::new(Cell::new(false));
        app.schedule_startup(StartupPipeline::new(vec![
            (
                2,
                Box::new(Flag {
                    name: "later",
                    ok: true,
                    ran: Rc::clone(&later),
                }),
            ),
            (
                1,
                Box::new(Flag {
                    name: "broken",
                    ok: false,
                    ran: Rc::new(Cell::new(false)),
                }),
            ),
        ]));
        app.scheduler().schedule_on_next_idle(|| Ok(()));

        let mut event_loop = app.event_loop();
        assert!(!event_loop.turn(None));
        assert!(!later.get());
        assert!(app.control().exit_requested());
        assert_eq!(
            app.startup_failure(),
            Some(StartupFailure {
                service: "broken".to_string()
            })
        );
    }

    #[test]
    fn test_shutdown_discards_pending() {
        let app = app();
        app.scheduler().schedule_on_next_idle(|| Ok(()));
        app.shutdown();
        assert!(app.control().exit_requested());
        assert_eq!(app.scheduler().pending(), 0);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_shutdown_releases_listeners() {
        let app = app();
        app.bus().subscribe(AppEvent::DefaultDeviceChanged, |_| {});
        app.shutdown();
        assert_eq!(app.bus().listener_count(AppEvent::DefaultDeviceChanged), 0);
    }

    #[test]
    fn test_loop_exit_goes_through_shutdown() {
        let app = app();
        let mut event_loop = app.event_loop();
        app.bus().subscribe(AppEvent::ToggleRequested, |_| {});

        let tx = event_loop.sender();
        let scheduler = app.scheduler().clone();
        app.scheduler().schedule_on_next_idle(move || {
            scheduler.schedule_on_next_idle(|| Ok(()));
            tx.send(LoopMessage::Exit).unwrap();
            Ok(())
        });

        block_on(app.run_interactive(&mut event_loop)).unwrap();

        assert!(app.control().exit_requested());
        assert_eq!(app.scheduler().pending(), 0);
        assert_eq!(app.bus().listener_count(AppEvent::ToggleRequested), 0);
    }

    #[test]
    fn test_run_interactive_reports_startup_failure() {
        let app = app();
        let mut event_loop = app.event_loop();
        app.schedule_startup(StartupPipeline::new(vec![(
            0,
            Box::new(Flag {
                name: "broken",
                ok: false,
                ran: Rc::new(Cell::new(false)),
            }),
        )]));

        let err = block_on(app.run_interactive(&mut event_loop)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StartupFailure>(),
            Some(&StartupFailure {
                service: "broken".to_string()
            })
        );
    }
}
