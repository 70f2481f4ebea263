//! Hook scheduler errors.

use crate::player::PlayerError;

/// Errors that can occur while attaching or running hooks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HookError {
    /// The player framework never signalled readiness within the retry budget.
    #[error("Failed to load YouTube player API from {href}")]
    ApiUnavailable { href: String },

    #[error(transparent)]
    Player(#[from] PlayerError),
}
