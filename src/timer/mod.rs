//! Timer abstraction used by the hook scheduler.
//!
//! The scheduler never sleeps or spawns. Every suspension point (readiness
//! retry, poll interval, deferred hook dispatch) is a [`Task`] handed to a
//! [`Timers`] implementation, which calls back into the scheduler when the
//! task is due:
//!
//! - [`VirtualClock`]: deterministic queue advanced explicitly by a driver
//!   (tests, the simulator)
//! - `web::WebTimers`: `setTimeout`/`clearTimeout` in the browser

mod virtual_clock;

pub use virtual_clock::VirtualClock;

use std::time::Duration;

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    /// Raw numeric value of the handle.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Work the scheduler asks to be woken up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Check again whether the player framework finished loading.
    ApiRetry,
    /// One periodic check of the playback position.
    Poll,
    /// Deferred invocation of the hook for a matched second.
    DispatchHook { second: i64 },
}

/// Timer facility injected into the scheduler.
pub trait Timers {
    /// Run `task` after `delay`. A zero delay means "on the next turn of the
    /// event loop", never inline.
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending task.
    ///
    /// Cancelling a task that already ran, was already cancelled, or never
    /// existed is a no-op.
    fn cancel(&mut self, id: TimerId);
}
