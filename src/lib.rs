//! Audio Switcher
//!
//! Toggles the default `PipeWire` playback device between two configured
//! endpoints ("headphones" and "speakers").
//!
//! # Modes
//! - **Switch**: `switch=1|headphones=...|speakers=...` toggles once and exits.
//! - **Interactive**: a single-threaded event loop runs the startup services on
//!   its first idle notification, then keeps an indicator in sync with the
//!   default device and toggles on request (`SIGUSR1`).
//!
//! Device names are matched ignoring case and whitespace, so fragments may be
//! typed loosely.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod invocation;
pub mod logging;
pub mod notification;
pub mod pipewire;
pub mod presentation;
pub mod scheduler;
pub mod services;
pub mod startup;
pub mod style;
pub mod toggle;

// Re-export commonly used types for convenience
pub use app::Application;
pub use cli::Args;
pub use config::Config;
pub use invocation::InvocationArgs;
