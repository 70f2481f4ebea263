//! ythook - timed hooks into embedded video players
//!
//! Attaches callbacks to an embedded player that fire once when playback
//! reaches given whole-second offsets. The player framework, its timers and
//! its readiness signal are injected, so the same [`HookScheduler`] runs in
//! the browser (feature `web`), inside any host event loop, or against the
//! deterministic simulator in [`sim`].
//!
//! ```
//! use ythook::sim::{self, PlaybackScript};
//! use ythook::SchedulerConfig;
//!
//! let script = PlaybackScript::new(vec![1, 3], 4.0).autoplay(true);
//! let report = sim::run(&script, &SchedulerConfig::default()).unwrap();
//! let seconds: Vec<i64> = report.fired.iter().map(|f| f.second).collect();
//! assert_eq!(seconds, vec![1, 3]);
//! ```

pub mod cli;
pub mod config;
pub mod hooks;
pub mod player;
pub mod sim;
pub mod timer;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use config::{Config, SchedulerConfig};
pub use hooks::{
    ApiReadiness, AttachRequest, HookError, HookFailure, HookFn, HookScheduler, HookSet,
    PlaybackSession,
};
pub use player::{Player, PlayerApi, PlayerError, PlayerEvent, PlayerState};
pub use timer::{Task, TimerId, Timers, VirtualClock};
