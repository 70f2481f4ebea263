//! Outcome of a simulated playback.

use std::fmt;

use serde::Serialize;

/// One hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredHook {
    /// The matched offset
    pub second: i64,
    /// Virtual time of the invocation
    pub at_ms: u64,
    /// Playback position read by the hook
    pub position: f64,
}

/// What happened during a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub fired: Vec<FiredHook>,
    /// Offsets that never fired
    pub pending: Vec<i64>,
    pub polls: u64,
    pub play_requests: u32,
    pub script_injections: usize,
    /// Non-fatal errors raised by poll ticks
    pub errors: Vec<String>,
    pub finished_at_ms: u64,
}

impl SimulationReport {
    /// Seconds whose hooks fired, in firing order.
    pub fn fired_seconds(&self) -> Vec<i64> {
        self.fired.iter().map(|f| f.second).collect()
    }
}

fn secs(ms: u64) -> String {
    format!("{:.3}s", ms as f64 / 1000.0)
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hook in &self.fired {
            writeln!(
                f,
                "hook {}s fired at {} (position {:.3})",
                hook.second,
                secs(hook.at_ms),
                hook.position
            )?;
        }
        if self.pending.is_empty() {
            writeln!(f, "pending: none")?;
        } else {
            let pending: Vec<String> = self.pending.iter().map(|s| format!("{}s", s)).collect();
            writeln!(f, "pending: {}", pending.join(", "))?;
        }
        for error in &self.errors {
            writeln!(f, "error: {}", error)?;
        }
        writeln!(f, "polls: {}", self.polls)?;
        writeln!(f, "play requests: {}", self.play_requests)?;
        writeln!(f, "script injections: {}", self.script_injections)?;
        write!(f, "finished at {}", secs(self.finished_at_ms))
    }
}
