//! The external player framework, seen from the scheduler.
//!
//! The framework itself (widget, script loading, event model) is not
//! reimplemented here. It is consumed through two traits:
//!
//! - [`PlayerApi`]: loads the framework and binds a player to an embed
//!   placeholder
//! - [`Player`]: the bound player handle (start playback, read position)
//!
//! Lifecycle notifications arrive as [`PlayerEvent`]s which the host feeds
//! into [`crate::HookScheduler::on_ready`] and
//! [`crate::HookScheduler::on_state_change`].

mod state;

pub use state::PlayerState;

/// Well-known location of the YouTube IFrame API script.
pub const YOUTUBE_IFRAME_API_HREF: &str = "//www.youtube.com/iframe_api";

/// Name of the global the framework calls once it has finished loading.
pub const API_READY_CALLBACK: &str = "onYouTubePlayerAPIReady";

/// Errors raised by the player framework.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("Failed to inject player API script from {href}: {message}")]
    Injection { href: String, message: String },

    #[error("Failed to bind player to '{container_id}': {message}")]
    Construct {
        container_id: String,
        message: String,
    },

    #[error("Failed to read playback position: {0}")]
    Position(String),
}

/// A player bound to one embed placeholder.
pub trait Player {
    /// Command playback to start.
    fn play_video(&mut self);

    /// Current playback position in seconds.
    fn current_time(&self) -> Result<f64, PlayerError>;
}

/// The player framework: script loading and player construction.
pub trait PlayerApi {
    type Player: Player + 'static;

    /// Start loading the framework script from `href`.
    ///
    /// Completion is signalled separately through
    /// [`crate::ApiReadiness::mark_ready`].
    fn inject_script(&mut self, href: &str) -> Result<(), PlayerError>;

    /// Bind a player to the placeholder identified by `container_id`.
    ///
    /// The returned player later emits [`PlayerEvent::Ready`] and
    /// [`PlayerEvent::StateChange`] to the host.
    fn construct(&mut self, container_id: &str) -> Result<Self::Player, PlayerError>;
}

/// Lifecycle notification emitted by a bound player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The player finished initialising and accepts commands.
    Ready,
    /// The playback state changed.
    StateChange(PlayerState),
}
