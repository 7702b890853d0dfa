//! Audio Switcher binary entry point
//!
//! Dispatches to device listing, switch mode or interactive mode.

use audio_switcher::app::Application;
use audio_switcher::cli::Args;
use audio_switcher::config::{Config, validate_log_level};
use audio_switcher::device::DeviceDirectory;
use audio_switcher::logging::{self, LogTarget};
use audio_switcher::notification::DesktopIndicator;
use audio_switcher::pipewire::PipeWire;
use audio_switcher::presentation::TrayPresenter;
use audio_switcher::services::{
    DeviceWatchService, NotificationIconService, ReadyService, ToolCheckService, WatchSlot,
};
use audio_switcher::startup::{StartupPipeline, StartupService};
use audio_switcher::{InvocationArgs, commands};
use clap::Parser;
use color_eyre::eyre::Result;
use std::cell::RefCell;
use std::rc::Rc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let invocation = InvocationArgs::from_optional(args.params.as_deref())?;

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    validate_log_level(&level)?;

    let directory = PipeWire::new(config.settings.watch_interval);

    if args.list_devices {
        logging::init(LogTarget::Stderr, &level)?;
        return commands::list_devices(&directory, &invocation, args.json);
    }

    if invocation.is_switch() {
        logging::init(LogTarget::Stderr, &level)?;
        return commands::switch_device(&directory, &invocation);
    }

    let target = if args.foreground {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    let _log_guard = logging::init(target, &level)?;

    run_interactive(invocation, &config, directory).await
}

/// Wire the interactive components and run until shutdown
async fn run_interactive(
    invocation: InvocationArgs,
    config: &Config,
    directory: PipeWire,
) -> Result<()> {
    let app = Application::new(invocation)?;
    let directory: Rc<dyn DeviceDirectory> = Rc::new(directory);
    let mut event_loop = app.event_loop();
    let watch_slot: WatchSlot = Rc::new(RefCell::new(None));

    let presenter = TrayPresenter::new(
        app.title(),
        app.args().headphones().map(String::from),
        Rc::clone(&directory),
        Box::new(DesktopIndicator::new(config.settings.notify_switch)),
    );

    let services: Vec<(i32, Box<dyn StartupService>)> = vec![
        (0, Box::new(ToolCheckService::new(PipeWire::validate_tools))),
        (
            10,
            Box::new(DeviceWatchService::new(
                Rc::clone(&directory),
                event_loop.sender(),
                Rc::clone(&watch_slot),
            )),
        ),
        (
            20,
            Box::new(NotificationIconService::new(
                presenter,
                Rc::clone(&directory),
                Rc::clone(app.args()),
                app.bus().clone(),
            )),
        ),
        (
            30,
            Box::new(ReadyService::new(
                app.title(),
                config.settings.notify_startup,
            )),
        ),
    ];
    app.schedule_startup(StartupPipeline::new(services));

    let result = app.run_interactive(&mut event_loop).await;
    watch_slot.borrow_mut().take();
    result
}
