//! Deterministic playback simulator.
//!
//! Runs a [`HookScheduler`](crate::HookScheduler) against a virtual clock
//! and a scripted player instead of a browser. A [`PlaybackScript`]
//! describes the hooks, when the player framework finishes loading, and
//! the user actions (play, pause, buffer, seek) over time; [`run`] plays it
//! out and returns a [`SimulationReport`] of what fired and when.

mod error;
mod player;
mod report;
mod runner;
mod script;

pub use error::SimError;
pub use player::{PlaybackModel, SimulatedApi, SimulatedPlayer};
pub use report::{FiredHook, SimulationReport};
pub use runner::run;
pub use script::{PlaybackScript, ScriptEvent};
