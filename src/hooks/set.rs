//! Pending hook offsets and the callback they trigger.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::player::Player;

/// Callback invoked with the matched second and the player handle.
pub type HookFn = Box<dyn FnMut(i64, &mut dyn Player)>;

/// Whole-second offsets still waiting to fire, plus the hook to call.
///
/// Offsets are kept in ascending order. Duplicates and values playback can
/// never reach (negative, past the end) are accepted as given: the latter
/// simply never match, and each match removes a single occurrence.
pub struct HookSet {
    at_seconds: Vec<i64>,
    hook: HookFn,
}

impl HookSet {
    pub fn new<I, F>(at_seconds: I, hook: F) -> Self
    where
        I: IntoIterator<Item = i64>,
        F: FnMut(i64, &mut dyn Player) + 'static,
    {
        let mut at_seconds: Vec<i64> = at_seconds.into_iter().collect();
        at_seconds.sort_unstable();
        Self {
            at_seconds,
            hook: Box::new(hook),
        }
    }

    /// Like [`HookSet::new`] for a hook that can fail.
    ///
    /// Errors are not handled by the scheduler. The returned
    /// [`HookFailure`] holds the latest one until the host takes it and
    /// raises it in its own terms, outside of any scheduler borrow.
    pub fn fallible<I, F, E>(at_seconds: I, mut hook: F) -> (Self, HookFailure<E>)
    where
        I: IntoIterator<Item = i64>,
        F: FnMut(i64, &mut dyn Player) -> Result<(), E> + 'static,
        E: 'static,
    {
        let slot: Rc<RefCell<Option<E>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        let set = Self::new(at_seconds, move |second, player: &mut dyn Player| {
            if let Err(e) = hook(second, player) {
                *sink.borrow_mut() = Some(e);
            }
        });
        (set, HookFailure { slot })
    }

    /// Offsets that have not fired yet, ascending.
    pub fn pending(&self) -> &[i64] {
        &self.at_seconds
    }

    pub fn is_empty(&self) -> bool {
        self.at_seconds.is_empty()
    }

    /// Remove the first pending occurrence of `second`.
    ///
    /// Returns true if `second` was pending.
    pub(crate) fn take_match(&mut self, second: i64) -> bool {
        match self.at_seconds.iter().position(|&s| s == second) {
            Some(idx) => {
                self.at_seconds.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn fire(&mut self, second: i64, player: &mut dyn Player) {
        (self.hook)(second, player);
    }
}

/// Error raised by the last failing invocation of a fallible hook.
pub struct HookFailure<E> {
    slot: Rc<RefCell<Option<E>>>,
}

impl<E> HookFailure<E> {
    /// Take the pending error, if a hook failed since the last call.
    pub fn take(&self) -> Option<E> {
        self.slot.borrow_mut().take()
    }
}

impl<E> fmt::Debug for HookFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookFailure")
            .field("pending", &self.slot.borrow().is_some())
            .finish()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("at_seconds", &self.at_seconds)
            .finish_non_exhaustive()
    }
}
