//! Playback script format.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A simulated playback: hooks, framework loading and user actions.
///
/// ```toml
/// at_seconds = [1, 3]
/// autoplay = true
/// duration_secs = 4.0
///
/// [[events]]
/// action = "pause"
/// at_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackScript {
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default)]
    pub at_seconds: Vec<i64>,
    #[serde(default)]
    pub autoplay: bool,
    /// When the framework reports ready, relative to attach
    #[serde(default)]
    pub api_ready_after_ms: u64,
    /// The framework never loads
    #[serde(default)]
    pub api_never_ready: bool,
    /// Length of the simulated video
    pub duration_secs: f64,
    /// Hard stop for the simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_for_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Upper bound on simulated video length (one year).
const MAX_DURATION_SECS: f64 = 365.0 * 24.0 * 3600.0;

fn default_container() -> String {
    "player".to_string()
}

/// A user action at a point in (virtual) wall time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptEvent {
    Play { at_ms: u64 },
    Pause { at_ms: u64 },
    Buffer { at_ms: u64 },
    Seek { at_ms: u64, to: f64 },
}

impl ScriptEvent {
    pub fn at_ms(&self) -> u64 {
        match *self {
            Self::Play { at_ms }
            | Self::Pause { at_ms }
            | Self::Buffer { at_ms }
            | Self::Seek { at_ms, .. } => at_ms,
        }
    }
}

impl PlaybackScript {
    pub fn new(at_seconds: Vec<i64>, duration_secs: f64) -> Self {
        Self {
            container: default_container(),
            at_seconds,
            autoplay: false,
            api_ready_after_ms: 0,
            api_never_ready: false,
            duration_secs,
            run_for_ms: None,
            events: Vec::new(),
        }
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn api_ready_after_ms(mut self, ms: u64) -> Self {
        self.api_ready_after_ms = ms;
        self
    }

    pub fn api_never_ready(mut self) -> Self {
        self.api_never_ready = true;
        self
    }

    pub fn run_for_ms(mut self, ms: u64) -> Self {
        self.run_for_ms = Some(ms);
        self
    }

    pub fn event(mut self, event: ScriptEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Load a script from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let script: Self = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            bail!("duration_secs must be a non-negative number");
        }
        if self.duration_secs > MAX_DURATION_SECS {
            bail!("duration_secs must be at most {}", MAX_DURATION_SECS);
        }
        for event in &self.events {
            if let ScriptEvent::Seek { to, .. } = event {
                if !to.is_finite() || *to < 0.0 || *to > MAX_DURATION_SECS {
                    bail!("seek target must be a non-negative number, got {}", to);
                }
            }
        }
        Ok(())
    }
}
