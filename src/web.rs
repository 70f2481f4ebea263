//! Browser binding to the YouTube IFrame API.
//!
//! Exposes the page-level surface:
//!
//! - `into(containerId, { atSeconds, hook }, startOnReady)`
//! - `window.onYouTubePlayerAPIReady`, installed on module start and wired
//!   to [`ApiReadiness::global`]
//!
//! Timers map onto `setTimeout`/`clearTimeout`. Each `into` call owns a
//! [`Session`] kept alive until its hooks have all fired or the framework
//! failed to load. An exception thrown by a hook propagates to the page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Array, Function, Object, Reflect};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::SchedulerConfig;
use crate::hooks::{ApiReadiness, AttachRequest, HookError, HookFailure, HookScheduler, HookSet};
use crate::player::{Player, PlayerApi, PlayerError, PlayerEvent, PlayerState, API_READY_CALLBACK};
use crate::timer::{Task, TimerId, Timers};

mod yt {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(js_namespace = YT)]
    extern "C" {
        pub type Player;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(container_id: &str, options: &JsValue) -> Result<Player, JsValue>;

        #[wasm_bindgen(method, js_name = playVideo)]
        pub fn play_video(this: &Player);

        #[wasm_bindgen(method, catch, js_name = getCurrentTime)]
        pub fn get_current_time(this: &Player) -> Result<f64, JsValue>;
    }
}

thread_local! {
    static SESSIONS: RefCell<Vec<Rc<Session>>> = RefCell::new(Vec::new());
}

/// Install `window.onYouTubePlayerAPIReady`.
#[wasm_bindgen(start)]
pub fn install() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let ready = Closure::<dyn FnMut()>::new(|| {
        ApiReadiness::global().mark_ready();
    });
    Reflect::set(&window, &JsValue::from_str(API_READY_CALLBACK), ready.as_ref())?;
    // Lives as long as the page
    ready.forget();
    Ok(())
}

/// Readiness callback, for pages that wire the framework up themselves.
#[wasm_bindgen(js_name = onYouTubePlayerAPIReady)]
pub fn on_api_ready() {
    ApiReadiness::global().mark_ready();
}

/// Register timed hooks against the player embedded at `container_id`.
///
/// `hooks` is `{ atSeconds: number[], hook: (second, player) => void }`.
/// Offsets that are not whole numbers can never match and are dropped.
#[wasm_bindgen(js_name = into)]
pub fn hook_into(container_id: &str, hooks: &JsValue, start_on_ready: bool) -> Result<(), JsValue> {
    let at_seconds = read_seconds(hooks)?;
    let hook: Function = Reflect::get(hooks, &JsValue::from_str("hook"))?.dyn_into()?;

    let player_slot: Rc<RefCell<Option<JsValue>>> = Rc::default();
    let (hook_set, thrown) = {
        let slot = Rc::clone(&player_slot);
        let this = hooks.clone();
        HookSet::fallible(at_seconds, move |second, _player: &mut dyn Player| {
            let player = slot.borrow().clone().unwrap_or(JsValue::UNDEFINED);
            hook.call2(&this, &JsValue::from_f64(second as f64), &player)
                .map(|_| ())
        })
    };

    let request = AttachRequest::new(container_id, hook_set).autoplay(start_on_ready);
    let session = Session::attach(
        ApiReadiness::global().clone(),
        &SchedulerConfig::default(),
        request,
        player_slot,
        thrown,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    SESSIONS.with(|sessions| sessions.borrow_mut().push(session));
    Ok(())
}

/// Stop keeping `session` alive.
fn release(session: &Session) {
    SESSIONS.with(|sessions| {
        sessions
            .borrow_mut()
            .retain(|kept| !std::ptr::eq(Rc::as_ptr(kept), session));
    });
}

fn read_seconds(hooks: &JsValue) -> Result<Vec<i64>, JsValue> {
    let value = Reflect::get(hooks, &JsValue::from_str("atSeconds"))?;
    if value.is_undefined() || value.is_null() {
        return Ok(Vec::new());
    }
    let array: Array = value.dyn_into()?;
    Ok(array
        .iter()
        .filter_map(|v| v.as_f64())
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
        .collect())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// One `into` call: its scheduler and the browser timers it uses.
///
/// Released from [`SESSIONS`] once the scheduler is finished and no timer
/// is left.
struct Session {
    inner: RefCell<Inner>,
    /// Exception of the last hook that threw, rethrown after the borrow ends
    thrown: HookFailure<JsValue>,
}

struct Inner {
    scheduler: Option<HookScheduler<WebApi>>,
    timers: WebTimers,
}

impl Inner {
    fn finished(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(|scheduler| scheduler.is_finished() && self.timers.is_idle())
    }

    /// Keep the closure that is running right now from being freed along
    /// with the session.
    fn retire(&mut self) {
        if let Some(spent) = self.timers.spent.take() {
            spent.forget();
        }
    }
}

impl Session {
    fn attach(
        readiness: ApiReadiness,
        config: &SchedulerConfig,
        request: AttachRequest,
        player_slot: Rc<RefCell<Option<JsValue>>>,
        thrown: HookFailure<JsValue>,
    ) -> Result<Rc<Self>, HookError> {
        let session = Rc::new_cyclic(|weak: &Weak<Session>| Session {
            inner: RefCell::new(Inner {
                scheduler: None,
                timers: WebTimers::new(weak.clone()),
            }),
            thrown,
        });

        let api = WebApi {
            session: Rc::downgrade(&session),
            player_slot,
        };
        {
            let mut inner = session.inner.borrow_mut();
            let Inner { scheduler, timers } = &mut *inner;
            *scheduler = Some(HookScheduler::attach(api, readiness, config, request, timers)?);
        }
        Ok(session)
    }

    fn fire(&self, id: TimerId, task: Task) {
        let (result, finished) = {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                warn!(timer = id.get(), "session busy, timer dropped");
                return;
            };
            let Inner { scheduler, timers } = &mut *inner;
            timers.retire(id);
            let result = match scheduler.as_mut() {
                Some(scheduler) => scheduler.on_timer(id, task, timers),
                None => Ok(()),
            };
            let finished = inner.finished();
            if finished {
                inner.retire();
            }
            (result, finished)
        };
        self.settle(result, finished);
    }

    fn handle_event(&self, event: PlayerEvent) {
        let (result, finished) = {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                warn!(?event, "session busy, player event dropped");
                return;
            };
            let Inner { scheduler, timers } = &mut *inner;
            let result = match scheduler.as_mut() {
                Some(scheduler) => scheduler.on_event(event, timers),
                None => Ok(()),
            };
            let finished = inner.finished();
            if finished {
                inner.retire();
            }
            (result, finished)
        };
        self.settle(result, finished);
    }

    /// Release a finished session, then raise whatever went wrong to the
    /// page. Must run with no borrow held: JS exceptions skip Rust drops.
    fn settle(&self, result: Result<(), HookError>, finished: bool) {
        if finished {
            release(self);
        }
        let thrown = self.thrown.take();
        if let Some(e) = thrown {
            wasm_bindgen::throw_val(e);
        }
        if let Err(e) = result {
            wasm_bindgen::throw_str(&e.to_string());
        }
    }
}

/// `setTimeout`-backed timers for one session.
struct WebTimers {
    session: Weak<Session>,
    next_id: u64,
    pending: HashMap<TimerId, (i32, Closure<dyn FnMut()>)>,
    /// Closure of the timer currently running; dropped on the next fire
    spent: Option<Closure<dyn FnMut()>>,
}

impl WebTimers {
    fn new(session: Weak<Session>) -> Self {
        Self {
            session,
            next_id: 0,
            pending: HashMap::new(),
            spent: None,
        }
    }

    /// Forget a timer that just fired, keeping its closure alive until it returns.
    fn retire(&mut self, id: TimerId) {
        if let Some((_, callback)) = self.pending.remove(&id) {
            self.spent = Some(callback);
        }
    }

    /// Whether no timer is waiting to fire.
    fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Timers for WebTimers {
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let session = self.session.clone();
        let callback = Closure::<dyn FnMut()>::once(move || {
            if let Some(session) = session.upgrade() {
                session.fire(id, task);
            }
        });
        let timeout = delay.as_millis().min(i32::MAX as u128) as i32;
        let handle = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    timeout,
                )
                .ok()
        });
        match handle {
            Some(handle) => {
                self.pending.insert(id, (handle, callback));
            }
            None => warn!(?task, "setTimeout unavailable, task dropped"),
        }
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some((handle, _callback)) = self.pending.remove(&id) {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }
}

/// The IFrame API as a [`PlayerApi`].
struct WebApi {
    session: Weak<Session>,
    player_slot: Rc<RefCell<Option<JsValue>>>,
}

impl PlayerApi for WebApi {
    type Player = WebPlayer;

    fn inject_script(&mut self, href: &str) -> Result<(), PlayerError> {
        inject_script(href).map_err(|e| PlayerError::Injection {
            href: href.to_string(),
            message: describe(&e),
        })
    }

    fn construct(&mut self, container_id: &str) -> Result<WebPlayer, PlayerError> {
        let construct_error = |e: JsValue| PlayerError::Construct {
            container_id: container_id.to_string(),
            message: describe(&e),
        };
        let options = player_options(&self.session).map_err(construct_error)?;
        let player = yt::Player::new(container_id, &options).map_err(construct_error)?;

        let handle: &JsValue = player.as_ref();
        *self.player_slot.borrow_mut() = Some(handle.clone());
        Ok(WebPlayer { player })
    }
}

/// `{ events: { onReady, onStateChange } }` routed back into the session.
fn player_options(session: &Weak<Session>) -> Result<JsValue, JsValue> {
    let on_ready = {
        let session = session.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            if let Some(session) = session.upgrade() {
                session.handle_event(PlayerEvent::Ready);
            }
        })
    };
    let on_state_change = {
        let session = session.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let state = Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64())
                .and_then(|code| PlayerState::from_code(code as i32));
            if let (Some(state), Some(session)) = (state, session.upgrade()) {
                session.handle_event(PlayerEvent::StateChange(state));
            }
        })
    };

    let events = Object::new();
    Reflect::set(&events, &JsValue::from_str("onReady"), on_ready.as_ref())?;
    Reflect::set(&events, &JsValue::from_str("onStateChange"), on_state_change.as_ref())?;
    // The player holds these for its whole life
    on_ready.forget();
    on_state_change.forget();

    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("events"), &events)?;
    Ok(options.into())
}

/// Insert `<script src=href>` before the first script element of the page.
fn inject_script(href: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let tag = document.create_element("script")?;
    tag.set_attribute("src", href)?;

    match document.get_elements_by_tag_name("script").item(0) {
        Some(first) => {
            let parent = first
                .parent_node()
                .ok_or_else(|| JsValue::from_str("script element has no parent"))?;
            let first: &web_sys::Node = &first;
            parent.insert_before(&tag, Some(first))?;
        }
        None => {
            let root = document
                .document_element()
                .ok_or_else(|| JsValue::from_str("no document element"))?;
            root.append_child(&tag)?;
        }
    }
    Ok(())
}

/// A bound IFrame player.
struct WebPlayer {
    player: yt::Player,
}

impl Player for WebPlayer {
    fn play_video(&mut self) {
        self.player.play_video();
    }

    fn current_time(&self) -> Result<f64, PlayerError> {
        self.player
            .get_current_time()
            .map_err(|e| PlayerError::Position(describe(&e)))
    }
}
