//! Idle-action scheduler
//!
//! Work that needs a live event loop is queued here and runs when the loop
//! reports idle. Each notification drains a snapshot of the queue; anything
//! scheduled while that snapshot runs waits for the next notification, which
//! is how recurring work re-registers itself.
//!
//! Single-threaded: the scheduler is `!Send` and only ever touched from the
//! loop thread.

use color_eyre::eyre::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{error, trace};

/// A deferred zero-argument action
pub type IdleAction = Box<dyn FnOnce() -> Result<()>>;

/// Cloneable handle to the loop's idle run-queue
#[derive(Clone, Default)]
pub struct IdleScheduler {
    queue: Rc<RefCell<VecDeque<IdleAction>>>,
}

impl IdleScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to run on the next idle notification
    pub fn schedule_on_next_idle<F>(&self, action: F)
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.queue.borrow_mut().push_back(Box::new(action));
    }

    /// Run everything queued before this call, in enqueue order
    ///
    /// The queue is emptied before the first action runs. A failing action is
    /// logged and the rest of the batch still runs. Returns the number of
    /// actions executed.
    pub fn on_idle_notification(&self) -> usize {
        // Borrow ends here, so actions may schedule more work
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        if batch.is_empty() {
            return 0;
        }

        let count = batch.len();
        trace!("Running {} idle action(s)", count);
        for action in batch {
            if let Err(e) = action() {
                error!("Idle action failed: {:#}", e);
            }
        }
        count
    }

    /// Drop all queued actions without running them
    pub fn discard_pending(&self) -> usize {
        let discarded = std::mem::take(&mut *self.queue.borrow_mut()).len();
        if discarded > 0 {
            trace!("Discarded {} pending idle action(s)", discarded);
        }
        discarded
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}
