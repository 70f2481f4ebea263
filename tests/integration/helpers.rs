//! Shared test doubles and fixtures.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use ythook::{
    ApiReadiness, AttachRequest, HookError, HookScheduler, HookSet, Player, PlayerApi,
    PlayerError, SchedulerConfig, Task, VirtualClock,
};

/// Directory holding the playback script fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// What the fake framework saw.
#[derive(Debug, Default)]
pub struct Probe {
    /// Positions returned by successive reads; the last one sticks
    pub positions: VecDeque<f64>,
    pub current: f64,
    pub reads: u32,
    pub play_calls: u32,
    pub injections: Vec<String>,
    pub constructed: Vec<String>,
    pub fail_reads: bool,
    pub fail_injection: bool,
}

pub type SharedProbe = Rc<RefCell<Probe>>;

pub fn probe_with_positions(positions: &[f64]) -> SharedProbe {
    Rc::new(RefCell::new(Probe {
        positions: positions.iter().copied().collect(),
        ..Probe::default()
    }))
}

pub struct FakeApi {
    pub probe: SharedProbe,
}

impl PlayerApi for FakeApi {
    type Player = FakePlayer;

    fn inject_script(&mut self, href: &str) -> Result<(), PlayerError> {
        let mut probe = self.probe.borrow_mut();
        if probe.fail_injection {
            return Err(PlayerError::Injection {
                href: href.to_string(),
                message: "no script element".to_string(),
            });
        }
        probe.injections.push(href.to_string());
        Ok(())
    }

    fn construct(&mut self, container_id: &str) -> Result<FakePlayer, PlayerError> {
        self.probe
            .borrow_mut()
            .constructed
            .push(container_id.to_string());
        Ok(FakePlayer {
            probe: Rc::clone(&self.probe),
        })
    }
}

pub struct FakePlayer {
    pub probe: SharedProbe,
}

impl Player for FakePlayer {
    fn play_video(&mut self) {
        self.probe.borrow_mut().play_calls += 1;
    }

    fn current_time(&self) -> Result<f64, PlayerError> {
        let mut probe = self.probe.borrow_mut();
        if probe.fail_reads {
            return Err(PlayerError::Position("player destroyed".to_string()));
        }
        probe.reads += 1;
        if let Some(next) = probe.positions.pop_front() {
            probe.current = next;
        }
        Ok(probe.current)
    }
}

/// Hook set that records the seconds it fires for.
pub fn recording_hooks(at_seconds: &[i64]) -> (HookSet, Rc<RefCell<Vec<i64>>>) {
    let fired: Rc<RefCell<Vec<i64>>> = Rc::default();
    let sink = Rc::clone(&fired);
    let hooks = HookSet::new(at_seconds.iter().copied(), move |second, _player: &mut dyn Player| {
        sink.borrow_mut().push(second);
    });
    (hooks, fired)
}

pub struct Harness {
    pub clock: VirtualClock<Task>,
    pub scheduler: HookScheduler<FakeApi>,
    pub probe: SharedProbe,
    pub fired: Rc<RefCell<Vec<i64>>>,
}

impl Harness {
    /// Scheduler attached with the framework already loaded.
    pub fn ready(at_seconds: &[i64], positions: &[f64]) -> Self {
        let readiness = ApiReadiness::new();
        readiness.mark_ready();
        Self::attach(at_seconds, positions, readiness, false)
            .expect("attach with ready API")
    }

    pub fn attach(
        at_seconds: &[i64],
        positions: &[f64],
        readiness: ApiReadiness,
        autoplay: bool,
    ) -> Result<Self, HookError> {
        Self::attach_with(
            &SchedulerConfig::default(),
            at_seconds,
            positions,
            readiness,
            autoplay,
        )
    }

    pub fn attach_with(
        config: &SchedulerConfig,
        at_seconds: &[i64],
        positions: &[f64],
        readiness: ApiReadiness,
        autoplay: bool,
    ) -> Result<Self, HookError> {
        Self::attach_probe(config, at_seconds, probe_with_positions(positions), readiness, autoplay)
    }

    /// Attach against an existing probe, so several schedulers can share one framework.
    pub fn attach_probe(
        config: &SchedulerConfig,
        at_seconds: &[i64],
        probe: SharedProbe,
        readiness: ApiReadiness,
        autoplay: bool,
    ) -> Result<Self, HookError> {
        let (hooks, fired) = recording_hooks(at_seconds);
        let mut clock: VirtualClock<Task> = VirtualClock::new();
        let scheduler = HookScheduler::attach(
            FakeApi {
                probe: Rc::clone(&probe),
            },
            readiness,
            config,
            AttachRequest::new("player", hooks).autoplay(autoplay),
            &mut clock,
        )?;
        Ok(Self {
            clock,
            scheduler,
            probe,
            fired,
        })
    }

    /// Run every task due up to `until`, then move the clock there.
    pub fn run_until(&mut self, until: Duration) -> Result<(), HookError> {
        while let Some((id, task)) = self.clock.pop_until(until) {
            self.scheduler.on_timer(id, task, &mut self.clock)?;
        }
        self.clock.advance_to(until);
        Ok(())
    }

    pub fn fired(&self) -> Vec<i64> {
        self.fired.borrow().clone()
    }

    pub fn reads(&self) -> u32 {
        self.probe.borrow().reads
    }

    /// Poll ticks currently queued.
    pub fn queued_polls(&self) -> usize {
        self.clock.pending().filter(|t| **t == Task::Poll).count()
    }
}
