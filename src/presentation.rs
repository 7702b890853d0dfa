//! Notification-area indicator
//!
//! [`TrayPresenter`] keeps a two-state indicator (headphones / speakers) in sync
//! with the system default playback device. It owns no device logic: on every
//! change notification it re-queries the directory and re-renders.
//!
//! Unlike the toggle, the headphones check here is an exact, unnormalized
//! comparison against the configured value.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::device::{DeviceDirectory, DeviceRole};
use crate::events::{AppEvent, EventBus, SubscriptionId};

/// Which icon the indicator shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    ShowingHeadphonesIcon,
    ShowingSpeakersIcon,
}

impl IndicatorState {
    /// `FreeDesktop` icon name for this state
    #[must_use]
    pub fn icon_name(self) -> &'static str {
        match self {
            Self::ShowingHeadphonesIcon => "audio-headphones",
            Self::ShowingSpeakersIcon => "audio-speakers",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ShowingHeadphonesIcon => "Headphones",
            Self::ShowingSpeakersIcon => "Speakers",
        }
    }
}

/// Rendering surface for the indicator
pub trait Indicator {
    fn set_tooltip(&mut self, text: &str);
    fn show_state(&mut self, state: IndicatorState);
    fn set_visible(&mut self, visible: bool);
    /// Release the underlying resource; no calls follow
    fn dispose(&mut self);
}

pub struct TrayPresenter {
    title: String,
    headphones: Option<String>,
    directory: Rc<dyn DeviceDirectory>,
    indicator: Box<dyn Indicator>,
    state: Option<IndicatorState>,
    subscription: Option<SubscriptionId>,
}

impl TrayPresenter {
    /// `headphones` is the configured headphones value; when absent every
    /// device renders as speakers.
    pub fn new(
        title: impl Into<String>,
        headphones: Option<String>,
        directory: Rc<dyn DeviceDirectory>,
        indicator: Box<dyn Indicator>,
    ) -> Self {
        Self {
            title: title.into(),
            headphones,
            directory,
            indicator,
            state: None,
            subscription: None,
        }
    }

    /// Set the tooltip and compute the initial state
    pub fn bind(&mut self) {
        self.indicator.set_tooltip(&self.title);
        self.refresh();
    }

    pub fn show(&mut self) {
        self.indicator.set_visible(true);
    }

    /// Current state; `None` until a query has succeeded
    #[must_use]
    pub fn state(&self) -> Option<IndicatorState> {
        self.state
    }

    /// Re-query the default device and re-render
    ///
    /// A failed query keeps the previous state.
    pub fn refresh(&mut self) {
        let device = match self.directory.default_device(DeviceRole::Multimedia) {
            Ok(device) => device,
            Err(e) => {
                warn!("Could not query default device for indicator: {}", e);
                return;
            }
        };

        let state = if self.headphones.as_deref() == Some(device.name.as_str()) {
            IndicatorState::ShowingHeadphonesIcon
        } else {
            IndicatorState::ShowingSpeakersIcon
        };

        debug!("Indicator: '{}' → {:?}", device.name, state);
        self.state = Some(state);
        self.indicator.show_state(state);
    }

    /// Bind `presenter` and route default-device changes to it
    pub fn attach(presenter: &Rc<RefCell<Self>>, bus: &EventBus) {
        presenter.borrow_mut().bind();
        let target = Rc::clone(presenter);
        let id = bus.subscribe(AppEvent::DefaultDeviceChanged, move |_| {
            target.borrow_mut().refresh();
        });
        presenter.borrow_mut().subscription = Some(id);
    }

    /// Stop reacting to device changes
    pub fn detach(&mut self, bus: &EventBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
    }
}

impl Drop for TrayPresenter {
    fn drop(&mut self) {
        self.indicator.dispose();
    }
}
