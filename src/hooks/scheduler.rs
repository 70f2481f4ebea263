//! Readiness gate, player lifecycle handling and the poll loop.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::HookError;
use super::readiness::ApiReadiness;
use super::session::PlaybackSession;
use super::set::HookSet;
use crate::config::SchedulerConfig;
use crate::player::{Player, PlayerApi, PlayerEvent, PlayerState};
use crate::timer::{Task, TimerId, Timers};

/// What to attach: the embed placeholder, the hooks and whether to autoplay.
#[derive(Debug)]
pub struct AttachRequest {
    pub container_id: String,
    pub hooks: HookSet,
    pub autoplay: bool,
}

impl AttachRequest {
    pub fn new(container_id: impl Into<String>, hooks: HookSet) -> Self {
        Self {
            container_id: container_id.into(),
            hooks,
            autoplay: false,
        }
    }

    /// Start playback as soon as the player reports ready.
    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

#[derive(Debug)]
enum Stage<P> {
    /// Waiting for the framework to load; `retries_left` checks remain
    /// after the pending one.
    AwaitingApi { retries_left: u32, timer: TimerId },
    Bound { player: P, session: PlaybackSession },
    /// The framework never loaded. Terminal.
    Failed,
}

/// Fires each pending hook once when playback reaches its second.
///
/// The scheduler is driven entirely from outside:
///
/// - [`on_timer`] when a task scheduled through [`Timers`] is due
/// - [`on_ready`] / [`on_state_change`] when the player emits events
///
/// While the player is playing, the position is read every poll interval
/// and rounded to the nearest second. A pending offset equal to it is
/// removed and its hook dispatched on the next tick of the event loop.
///
/// [`on_timer`]: HookScheduler::on_timer
/// [`on_ready`]: HookScheduler::on_ready
/// [`on_state_change`]: HookScheduler::on_state_change
pub struct HookScheduler<A: PlayerApi> {
    api: A,
    readiness: ApiReadiness,
    config: SchedulerConfig,
    container_id: String,
    hooks: HookSet,
    autoplay: bool,
    stage: Stage<A::Player>,
    polls: u64,
}

impl<A: PlayerApi> HookScheduler<A> {
    /// Register timed hooks against the player embedded at
    /// `request.container_id`.
    ///
    /// If the framework is already loaded the player is bound immediately.
    /// Otherwise the framework script is injected (once per `readiness`)
    /// and readiness is re-checked through [`Task::ApiRetry`] timers. An
    /// exhausted retry budget surfaces as [`HookError::ApiUnavailable`] from
    /// [`on_timer`](Self::on_timer).
    pub fn attach(
        api: A,
        readiness: ApiReadiness,
        config: &SchedulerConfig,
        request: AttachRequest,
        timers: &mut dyn Timers,
    ) -> Result<Self, HookError> {
        let AttachRequest {
            container_id,
            hooks,
            autoplay,
        } = request;
        debug!(container = %container_id, hooks = ?hooks.pending(), autoplay, "attaching");

        let mut scheduler = Self {
            api,
            readiness,
            config: config.clone(),
            container_id,
            hooks,
            autoplay,
            stage: Stage::Failed,
            polls: 0,
        };
        scheduler.await_api(config.api_retries, timers)?;
        Ok(scheduler)
    }

    /// Handle a due timer task.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        task: Task,
        timers: &mut dyn Timers,
    ) -> Result<(), HookError> {
        match task {
            Task::ApiRetry => match self.stage {
                Stage::AwaitingApi {
                    retries_left,
                    timer,
                } if timer == id => self.await_api(retries_left, timers),
                _ => Ok(()),
            },
            Task::Poll => match &mut self.stage {
                Stage::Bound { session, .. } if session.owns(id) => {
                    session.disarm();
                    self.poll(timers)
                }
                _ => {
                    debug!(timer = id.get(), "ignoring stale poll tick");
                    Ok(())
                }
            },
            Task::DispatchHook { second } => {
                self.dispatch(second);
                Ok(())
            }
        }
    }

    /// Handle a player lifecycle event.
    pub fn on_event(&mut self, event: PlayerEvent, timers: &mut dyn Timers) -> Result<(), HookError> {
        match event {
            PlayerEvent::Ready => {
                self.on_ready();
                Ok(())
            }
            PlayerEvent::StateChange(state) => self.on_state_change(state, timers),
        }
    }

    /// The player finished initialising.
    pub fn on_ready(&mut self) {
        if let Stage::Bound { player, .. } = &mut self.stage {
            if self.autoplay {
                debug!(container = %self.container_id, "autoplay");
                player.play_video();
            }
        }
    }

    /// The player changed playback state.
    ///
    /// Entering [`PlayerState::Playing`] starts polling unless a tick is
    /// already scheduled. Pausing, buffering or ending cancels the pending
    /// tick. Other states are ignored.
    pub fn on_state_change(
        &mut self,
        state: PlayerState,
        timers: &mut dyn Timers,
    ) -> Result<(), HookError> {
        let Stage::Bound { session, .. } = &mut self.stage else {
            return Ok(());
        };
        debug!(%state, "player state changed");

        match state {
            PlayerState::Playing if !session.is_polling() => self.poll(timers),
            s if s.halts_playback() => {
                session.cancel(timers);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Offsets that have not fired yet, ascending.
    pub fn pending_seconds(&self) -> &[i64] {
        self.hooks.pending()
    }

    /// Whether a player has been bound.
    pub fn is_bound(&self) -> bool {
        matches!(self.stage, Stage::Bound { .. })
    }

    /// Whether the framework failed to load.
    pub fn has_failed(&self) -> bool {
        matches!(self.stage, Stage::Failed)
    }

    /// Whether a poll tick is currently scheduled.
    pub fn is_polling(&self) -> bool {
        match &self.stage {
            Stage::Bound { session, .. } => session.is_polling(),
            _ => false,
        }
    }

    /// Whether nothing more can happen: the framework failed to load, or
    /// playback started and every hook has been matched.
    ///
    /// Hook dispatches already scheduled may still be due.
    pub fn is_finished(&self) -> bool {
        match &self.stage {
            Stage::Failed => true,
            Stage::Bound { session, .. } => {
                self.polls > 0 && self.hooks.is_empty() && !session.is_polling()
            }
            Stage::AwaitingApi { .. } => false,
        }
    }

    /// Number of poll ticks run so far.
    pub fn poll_count(&self) -> u64 {
        self.polls
    }

    /// The bound player, if any.
    pub fn player(&self) -> Option<&A::Player> {
        match &self.stage {
            Stage::Bound { player, .. } => Some(player),
            _ => None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn await_api(&mut self, retries_left: u32, timers: &mut dyn Timers) -> Result<(), HookError> {
        if self.readiness.is_ready() {
            return self.bind();
        }
        if retries_left == 0 {
            self.stage = Stage::Failed;
            warn!(href = %self.config.api_href, "player API never became ready");
            return Err(HookError::ApiUnavailable {
                href: self.config.api_href.clone(),
            });
        }
        if self.readiness.claim_injection() {
            debug!(href = %self.config.api_href, "injecting player API script");
            if let Err(e) = self.api.inject_script(&self.config.api_href) {
                self.stage = Stage::Failed;
                return Err(e.into());
            }
        }

        let timer = timers.schedule(self.config.api_retry_delay(), Task::ApiRetry);
        self.stage = Stage::AwaitingApi {
            retries_left: retries_left - 1,
            timer,
        };
        Ok(())
    }

    fn bind(&mut self) -> Result<(), HookError> {
        match self.api.construct(&self.container_id) {
            Ok(player) => {
                info!(container = %self.container_id, "player bound");
                self.stage = Stage::Bound {
                    player,
                    session: PlaybackSession::default(),
                };
                Ok(())
            }
            Err(e) => {
                self.stage = Stage::Failed;
                Err(e.into())
            }
        }
    }

    fn poll(&mut self, timers: &mut dyn Timers) -> Result<(), HookError> {
        let Stage::Bound { player, session } = &mut self.stage else {
            return Ok(());
        };
        self.polls += 1;

        if self.hooks.is_empty() {
            debug!("no pending hooks, polling stopped");
            return Ok(());
        }

        let position = match player.current_time() {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "position read failed, polling stopped");
                return Err(e.into());
            }
        };

        if let Some(second) = whole_second(position) {
            if self.hooks.take_match(second) {
                debug!(second, position, "hook matched");
                timers.schedule(Duration::ZERO, Task::DispatchHook { second });
            }
        }

        if !self.hooks.is_empty() {
            session.arm(timers.schedule(self.config.poll_interval(), Task::Poll));
        }
        Ok(())
    }

    fn dispatch(&mut self, second: i64) {
        if let Stage::Bound { player, .. } = &mut self.stage {
            info!(second, "firing hook");
            self.hooks.fire(second, player);
        }
    }
}

/// Round a position to the nearest whole second, halves away from zero.
fn whole_second(position: f64) -> Option<i64> {
    if position.is_finite() {
        Some(position.round() as i64)
    } else {
        None
    }
}
