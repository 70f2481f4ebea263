//! Per-player poll state.

use crate::timer::{TimerId, Timers};

/// Poll state for one bound player.
///
/// A session polls while `poll_timer` holds the id of the next scheduled
/// tick. A tick arriving with any other id is stale.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    poll_timer: Option<TimerId>,
}

impl PlaybackSession {
    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_some()
    }

    /// Id of the next scheduled poll tick.
    pub fn poll_timer(&self) -> Option<TimerId> {
        self.poll_timer
    }

    /// Whether `id` is the tick this session is waiting for.
    pub(crate) fn owns(&self, id: TimerId) -> bool {
        self.poll_timer == Some(id)
    }

    pub(crate) fn arm(&mut self, id: TimerId) {
        self.poll_timer = Some(id);
    }

    /// Forget the current tick (it fired, or polling ended).
    pub(crate) fn disarm(&mut self) {
        self.poll_timer = None;
    }

    /// Cancel the pending tick, if any.
    pub(crate) fn cancel(&mut self, timers: &mut dyn Timers) {
        if let Some(id) = self.poll_timer.take() {
            timers.cancel(id);
        }
    }
}
