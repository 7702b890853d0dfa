//! Application event bus
//!
//! Maps each event kind to an ordered list of listeners. Dispatch is synchronous
//! and runs on the loop thread.
//!
//! Listeners may subscribe or unsubscribe while an event is being dispatched.
//! New listeners first hear the *next* emission. A listener removed mid-dispatch
//! is not called again, including later in the same emission.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

/// Events delivered to listeners on the loop thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    /// The system default playback device changed; re-query to learn the new one
    DefaultDeviceChanged,
    /// The user asked the running instance to toggle devices
    ToggleRequested,
}

/// Identifies one registration, for unsubscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(AppEvent)>;

#[derive(Default)]
struct Registry {
    listeners: HashMap<AppEvent, Vec<(SubscriptionId, Listener)>>,
    /// Listeners taken out by an ongoing `emit`
    in_flight: HashSet<SubscriptionId>,
    /// In-flight listeners unsubscribed before their emission finished
    removed: HashSet<SubscriptionId>,
}

/// Cloneable handle to the listener table
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
    next_id: Rc<Cell<u64>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`; listeners run in subscription order
    pub fn subscribe<F>(&self, event: AppEvent, listener: F) -> SubscriptionId
    where
        F: FnMut(AppEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.registry
            .borrow_mut()
            .listeners
            .entry(event)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a registration; unknown ids are ignored
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let removed = {
            let mut registry = self.registry.borrow_mut();
            if registry.in_flight.contains(&id) {
                registry.removed.insert(id);
                None
            } else {
                registry.listeners.values_mut().find_map(|list| {
                    let index = list.iter().position(|(sid, _)| *sid == id)?;
                    Some(list.remove(index))
                })
            }
        };
        // Listener destructors may call back into the bus
        drop(removed);
    }

    /// Deliver `event` to its listeners, returning how many ran
    pub fn emit(&self, event: AppEvent) -> usize {
        let (taken, ids) = {
            let mut registry = self.registry.borrow_mut();
            let taken = registry.listeners.remove(&event).unwrap_or_default();
            let ids: Vec<SubscriptionId> = taken.iter().map(|(id, _)| *id).collect();
            registry.in_flight.extend(ids.iter().copied());
            (taken, ids)
        };

        let mut delivered = 0;
        let mut kept = Vec::with_capacity(taken.len());
        for (id, mut listener) in taken {
            if self.registry.borrow().removed.contains(&id) {
                continue;
            }
            listener(event);
            delivered += 1;
            kept.push((id, listener));
        }

        let dropped = {
            let mut registry = self.registry.borrow_mut();
            let (kept, dropped): (Vec<_>, Vec<_>) = kept
                .into_iter()
                .partition(|(id, _)| !registry.removed.contains(id));
            for id in &ids {
                registry.in_flight.remove(id);
                registry.removed.remove(id);
            }

            let mut listeners = kept;
            listeners.extend(registry.listeners.remove(&event).unwrap_or_default());
            if !listeners.is_empty() {
                registry.listeners.insert(event, listeners);
            }
            dropped
        };
        drop(dropped);

        trace!("{:?} delivered to {} listener(s)", event, delivered);
        delivered
    }

    #[must_use]
    pub fn listener_count(&self, event: AppEvent) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(&event)
            .map_or(0, Vec::len)
    }

    /// Drop every listener (and whatever they captured)
    ///
    /// Listeners of an emission in progress are not called again and are
    /// dropped when it finishes.
    pub fn clear(&self) {
        let drained = {
            let mut registry = self.registry.borrow_mut();
            let in_flight: Vec<SubscriptionId> = registry.in_flight.iter().copied().collect();
            registry.removed.extend(in_flight);
            std::mem::take(&mut registry.listeners)
        };
        // Listener destructors may call back into the bus
        drop(drained);
    }
}
