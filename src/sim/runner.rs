//! Drives a scheduler through a playback script on a virtual clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::SimError;
use super::player::{PlaybackModel, SimulatedApi};
use super::report::{FiredHook, SimulationReport};
use super::script::{PlaybackScript, ScriptEvent};
use crate::config::SchedulerConfig;
use crate::hooks::{ApiReadiness, AttachRequest, HookError, HookScheduler, HookSet};
use crate::player::Player;
use crate::timer::{Task, VirtualClock};

/// Everything that can become due on the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SimEvent {
    Scheduler(Task),
    ApiLoaded,
    Script(ScriptEvent),
}

impl From<Task> for SimEvent {
    fn from(task: Task) -> Self {
        Self::Scheduler(task)
    }
}

/// Play `script` out against a fresh scheduler.
///
/// The run ends when nothing is left to happen (no timers, no script
/// events, video not playing) or at `run_for_ms`. A framework that never
/// loads makes the run fail with [`HookError::ApiUnavailable`], like the
/// attach it simulates. Other scheduler errors are recorded in the report.
///
/// Both inputs are validated first; a zero poll interval or a non-finite
/// duration is rejected before any virtual time passes.
pub fn run(
    script: &PlaybackScript,
    config: &SchedulerConfig,
) -> Result<SimulationReport, SimError> {
    config
        .validate()
        .map_err(|e| SimError::Config(format!("{:#}", e)))?;
    script
        .validate()
        .map_err(|e| SimError::Script(format!("{:#}", e)))?;

    let model = PlaybackModel::shared(script.duration_secs);
    let fired: Rc<RefCell<Vec<FiredHook>>> = Rc::default();
    let readiness = ApiReadiness::new();
    let mut clock: VirtualClock<SimEvent> = VirtualClock::new();

    if !script.api_never_ready {
        if script.api_ready_after_ms == 0 {
            readiness.mark_ready();
        } else {
            clock.push(
                Duration::from_millis(script.api_ready_after_ms),
                SimEvent::ApiLoaded,
            );
        }
    }
    for event in &script.events {
        clock.push(Duration::from_millis(event.at_ms()), SimEvent::Script(*event));
    }

    let hooks = {
        let model = Rc::clone(&model);
        let fired = Rc::clone(&fired);
        HookSet::new(
            script.at_seconds.iter().copied(),
            move |second, player: &mut dyn Player| {
                let position = player.current_time().unwrap_or(f64::NAN);
                let at_ms = model.borrow().now().as_millis() as u64;
                fired.borrow_mut().push(FiredHook {
                    second,
                    at_ms,
                    position,
                });
            },
        )
    };
    let request = AttachRequest::new(script.container.clone(), hooks).autoplay(script.autoplay);
    let mut scheduler = HookScheduler::attach(
        SimulatedApi::new(Rc::clone(&model)),
        readiness.clone(),
        config,
        request,
        &mut clock,
    )?;

    let deadline = script
        .run_for_ms
        .map(Duration::from_millis)
        .unwrap_or(Duration::MAX);
    let mut errors = Vec::new();

    loop {
        // Deliver player events before anything else becomes due
        loop {
            let event = model.borrow_mut().take_event();
            let Some(event) = event else { break };
            if let Err(e) = scheduler.on_event(event, &mut clock) {
                warn!(error = %e, "scheduler error");
                errors.push(e.to_string());
            }
        }

        let end = model.borrow().end_instant();
        if let Some(end) = end {
            let before_next = clock.next_due().map_or(true, |due| end <= due);
            if end <= deadline && before_next {
                clock.advance_to(end);
                model.borrow_mut().advance_to(end);
                continue;
            }
        }

        let Some((id, event)) = clock.pop_until(deadline) else {
            break;
        };
        model.borrow_mut().advance_to(clock.now());
        debug!(at_ms = clock.now().as_millis() as u64, ?event, "simulation step");

        match event {
            SimEvent::Scheduler(task) => match scheduler.on_timer(id, task, &mut clock) {
                Ok(()) => {}
                Err(e @ HookError::ApiUnavailable { .. }) => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "scheduler error");
                    errors.push(e.to_string());
                }
            },
            SimEvent::ApiLoaded => {
                readiness.mark_ready();
            }
            SimEvent::Script(action) => model.borrow_mut().apply(action),
        }
    }

    let finished_at_ms = clock.now().as_millis() as u64;
    let model = model.borrow();
    let fired = fired.borrow().clone();
    Ok(SimulationReport {
        fired,
        pending: scheduler.pending_seconds().to_vec(),
        polls: scheduler.poll_count(),
        play_requests: model.play_requests(),
        script_injections: model.injected().len(),
        errors,
        finished_at_ms,
    })
}
