//! Timed hook dispatch against a polled playback clock.
//!
//! # Architecture
//!
//! - `set`: [`HookSet`] - pending offsets plus the user callback
//! - `session`: [`PlaybackSession`] - the poll timer of one playing stretch
//! - `readiness`: [`ApiReadiness`] - set-once "framework loaded" flag
//! - `scheduler`: [`HookScheduler`] - readiness gate, player lifecycle and
//!   poll loop
//! - `error`: [`HookError`]

mod error;
mod readiness;
mod scheduler;
mod session;
mod set;

pub use error::HookError;
pub use readiness::ApiReadiness;
pub use scheduler::{AttachRequest, HookScheduler};
pub use session::PlaybackSession;
pub use set::{HookFailure, HookFn, HookSet};
