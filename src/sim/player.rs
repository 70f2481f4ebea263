//! Scripted stand-ins for the player framework.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::script::ScriptEvent;
use crate::player::{Player, PlayerApi, PlayerError, PlayerEvent, PlayerState};

/// Simulated video: position, playback state and pending player events.
///
/// The position advances with virtual time while playing and is clamped to
/// the video duration; reaching the end switches to [`PlayerState::Ended`].
/// State changes are queued as [`PlayerEvent`]s for the driver to deliver.
#[derive(Debug)]
pub struct PlaybackModel {
    now: Duration,
    /// Position at `anchor`
    position: f64,
    anchor: Duration,
    state: PlayerState,
    duration: f64,
    events: VecDeque<PlayerEvent>,
    play_requests: u32,
    injected: Vec<String>,
    container: Option<String>,
}

impl PlaybackModel {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            now: Duration::ZERO,
            position: 0.0,
            anchor: Duration::ZERO,
            state: PlayerState::Unstarted,
            duration: duration_secs.max(0.0),
            events: VecDeque::new(),
            play_requests: 0,
            injected: Vec::new(),
            container: None,
        }
    }

    pub fn shared(duration_secs: f64) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(duration_secs)))
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Playback position at the current virtual time.
    pub fn position(&self) -> f64 {
        if self.state == PlayerState::Playing {
            let elapsed = self.now.saturating_sub(self.anchor).as_secs_f64();
            (self.position + elapsed).min(self.duration)
        } else {
            self.position
        }
    }

    /// Virtual time at which the video reaches its end, while playing.
    pub fn end_instant(&self) -> Option<Duration> {
        if self.state != PlayerState::Playing {
            return None;
        }
        let remaining = (self.duration - self.position).max(0.0);
        Some(self.anchor + Duration::from_secs_f64(remaining))
    }

    /// Move virtual time forward, ending playback if the video ran out.
    ///
    /// The end is decided on virtual time against [`end_instant`], not on
    /// the recomputed position, which can land a hair short of the duration.
    ///
    /// [`end_instant`]: PlaybackModel::end_instant
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
        let ran_out = self
            .end_instant()
            .is_some_and(|end| self.now >= end || self.position() >= self.duration);
        if ran_out {
            self.position = self.duration;
            self.anchor = self.now;
            self.set_state(PlayerState::Ended);
        }
    }

    /// Apply a scripted user action at the current virtual time.
    pub fn apply(&mut self, event: ScriptEvent) {
        match event {
            ScriptEvent::Play { .. } => self.play(),
            ScriptEvent::Pause { .. } => {
                if matches!(self.state, PlayerState::Playing | PlayerState::Buffering) {
                    self.settle();
                    self.set_state(PlayerState::Paused);
                }
            }
            ScriptEvent::Buffer { .. } => {
                if self.state == PlayerState::Playing {
                    self.settle();
                    self.set_state(PlayerState::Buffering);
                }
            }
            ScriptEvent::Seek { to, .. } => {
                self.settle();
                self.position = to.min(self.duration);
            }
        }
    }

    /// Start (or restart, after the end) playback.
    pub fn play(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        if self.state == PlayerState::Ended || self.position >= self.duration {
            self.position = 0.0;
        }
        self.anchor = self.now;
        self.set_state(PlayerState::Playing);
    }

    /// Next player event waiting for delivery.
    pub fn take_event(&mut self) -> Option<PlayerEvent> {
        self.events.pop_front()
    }

    pub fn play_requests(&self) -> u32 {
        self.play_requests
    }

    /// Script URLs injected so far.
    pub fn injected(&self) -> &[String] {
        &self.injected
    }

    /// Container the player was bound to, once constructed.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    fn settle(&mut self) {
        self.position = self.position();
        self.anchor = self.now;
    }

    fn set_state(&mut self, state: PlayerState) {
        self.state = state;
        self.events.push_back(PlayerEvent::StateChange(state));
    }
}

/// Player framework backed by a shared [`PlaybackModel`].
#[derive(Debug, Clone)]
pub struct SimulatedApi {
    model: Rc<RefCell<PlaybackModel>>,
}

impl SimulatedApi {
    pub fn new(model: Rc<RefCell<PlaybackModel>>) -> Self {
        Self { model }
    }
}

impl PlayerApi for SimulatedApi {
    type Player = SimulatedPlayer;

    fn inject_script(&mut self, href: &str) -> Result<(), PlayerError> {
        self.model.borrow_mut().injected.push(href.to_string());
        Ok(())
    }

    fn construct(&mut self, container_id: &str) -> Result<SimulatedPlayer, PlayerError> {
        let mut model = self.model.borrow_mut();
        model.container = Some(container_id.to_string());
        model.events.push_back(PlayerEvent::Ready);
        Ok(SimulatedPlayer {
            model: Rc::clone(&self.model),
        })
    }
}

/// Player handle backed by a shared [`PlaybackModel`].
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    model: Rc<RefCell<PlaybackModel>>,
}

impl Player for SimulatedPlayer {
    fn play_video(&mut self) {
        let mut model = self.model.borrow_mut();
        model.play_requests += 1;
        model.play();
    }

    fn current_time(&self) -> Result<f64, PlayerError> {
        Ok(self.model.borrow().position())
    }
}
