//! Desktop notifications
//!
//! Renders the indicator through notify-rust using `FreeDesktop` standard icon
//! names. There is no persistent tray surface: each state change is logged and,
//! if enabled, announced with a transient notification.

use color_eyre::eyre::{Context, Result};
use notify_rust::Notification;
use tracing::{info, warn};

use crate::presentation::{Indicator, IndicatorState};

const APP_NAME: &str = "Audio Switcher";

/// Send a desktop notification
///
/// # Errors
/// Returns an error if the notification cannot be sent (e.g., no notification daemon running).
pub fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<()> {
    let icon = icon.unwrap_or("audio-card");

    Notification::new()
        .summary(summary)
        .body(body)
        .appname(APP_NAME)
        .icon(icon)
        .timeout(3000)
        .show()
        .context("Failed to show notification")?;

    Ok(())
}

/// Notification-backed [`Indicator`]
pub struct DesktopIndicator {
    tooltip: String,
    notify: bool,
    visible: bool,
    disposed: bool,
    current: Option<IndicatorState>,
}

impl DesktopIndicator {
    /// `notify` enables a notification on each state change while visible
    #[must_use]
    pub fn new(notify: bool) -> Self {
        Self {
            tooltip: APP_NAME.to_string(),
            notify,
            visible: false,
            disposed: false,
            current: None,
        }
    }

    fn announce(&self, state: IndicatorState) {
        if !self.notify || !self.visible {
            return;
        }
        let body = format!("Output: {}", state.label());
        if let Err(e) = send_notification(&self.tooltip, &body, Some(state.icon_name())) {
            warn!("Could not send indicator notification: {:#}", e);
        }
    }
}

impl Indicator for DesktopIndicator {
    fn set_tooltip(&mut self, text: &str) {
        self.tooltip = text.to_string();
    }

    fn show_state(&mut self, state: IndicatorState) {
        if self.disposed || self.current == Some(state) {
            return;
        }
        info!("Indicator: {}", state.label());
        self.current = Some(state);
        self.announce(state);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible && !self.disposed;
    }

    fn dispose(&mut self) {
        self.visible = false;
        self.disposed = true;
    }
}
