//! Simulation errors.

use crate::hooks::HookError;

/// Errors that stop a simulation run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Invalid scheduler config: {0}")]
    Config(String),

    #[error("Invalid playback script: {0}")]
    Script(String),

    #[error(transparent)]
    Hook(#[from] HookError),
}
