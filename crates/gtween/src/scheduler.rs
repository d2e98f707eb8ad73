// scheduler.rs
//
// The single point of time injection. Owns every root tween/sequence and
// advances them once per host frame.
//
// Usage:
//   let mut scheduler = Scheduler::new();
//   let id = scheduler.play(tween.into())?;
//   scheduler.tick(dt)?;  // once per frame, from the host's main loop

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::builder::{tween_property, tween_value, TweenBuilder};
use crate::config::SchedulerConfig;
use crate::error::{check_delta, TweenError};
use crate::playable::Playable;
use crate::playback::PlaybackState;
use crate::value::Lerp;

/// Handle to a registered root for later control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// A root that failed during a tick. A panicking callback also kills its
/// root; any other failure leaves the root as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackFault {
    pub id: TweenId,
    pub message: String,
}

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Roots that were advanced.
    pub advanced: usize,
    /// Roots evicted because they completed.
    pub completed: Vec<TweenId>,
    /// Roots evicted because they were killed.
    pub killed: Vec<TweenId>,
    pub faults: Vec<CallbackFault>,
}

enum Command {
    Register(TweenId, Playable),
    Kill(TweenId, bool),
}

struct Shared {
    next_id: Cell<u64>,
    queue: RefCell<Vec<Command>>,
}

impl Shared {
    fn allocate(&self) -> TweenId {
        let id = TweenId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        id
    }
}

/// Cloneable handle for use inside callbacks.
///
/// Requests are queued and applied at the next tick boundary: a root
/// registered from a callback is first advanced on the following tick.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Rc<Shared>,
}

impl SchedulerHandle {
    /// Queue a root as-is (an Idle root waits for [`Scheduler::restart`]).
    pub fn register(&self, playable: Playable) -> TweenId {
        let id = self.shared.allocate();
        self.shared.queue.borrow_mut().push(Command::Register(id, playable));
        id
    }

    /// Play then queue a root.
    pub fn play(&self, mut playable: Playable) -> Result<TweenId, TweenError> {
        playable.play()?;
        Ok(self.register(playable))
    }

    /// Queue a kill for `id`.
    pub fn kill(&self, id: TweenId, trigger_callback: bool) {
        self.shared.queue.borrow_mut().push(Command::Kill(id, trigger_callback));
    }
}

struct Entry {
    id: TweenId,
    playable: Playable,
}

/// Owns the active roots and advances them on every tick.
///
/// Single-threaded: callers driving it from several threads must serialize
/// access themselves.
pub struct Scheduler {
    entries: Vec<Entry>,
    config: SchedulerConfig,
    shared: Rc<Shared>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            config: SchedulerConfig::default(),
            shared: Rc::new(Shared {
                next_id: Cell::new(1),
                queue: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn with_config(config: SchedulerConfig) -> Result<Self, TweenError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: self.shared.clone(),
        }
    }

    /// Builder over a setter with an explicit start, preset with the
    /// configured default easing.
    pub fn tween_value<V: Lerp>(
        &self,
        setter: impl FnMut(V) + 'static,
        start: V,
        end: V,
        duration: f32,
    ) -> TweenBuilder<V> {
        tween_value(setter, start, end, duration).easing(self.config.default_easing)
    }

    /// Builder over a getter/setter pair, preset with the configured
    /// default easing.
    pub fn tween_property<V: Lerp>(
        &self,
        getter: impl FnMut() -> V + 'static,
        setter: impl FnMut(V) + 'static,
        end: V,
        duration: f32,
    ) -> TweenBuilder<V> {
        tween_property(getter, setter, end, duration).easing(self.config.default_easing)
    }

    /// Add a root without touching its state.
    pub fn register(&mut self, playable: Playable) -> TweenId {
        let id = self.shared.allocate();
        log::debug!("registered root {:?}", id);
        self.entries.push(Entry { id, playable });
        id
    }

    /// Play a root and add it.
    pub fn play(&mut self, mut playable: Playable) -> Result<TweenId, TweenError> {
        playable.play()?;
        Ok(self.register(playable))
    }

    /// Play a registered root again from the beginning.
    pub fn restart(&mut self, id: TweenId) -> Result<bool, TweenError> {
        match self.get_mut(id) {
            Some(playable) => playable.play().map(|_| true),
            None => Ok(false),
        }
    }

    pub fn pause(&mut self, id: TweenId) {
        if let Some(playable) = self.get_mut(id) {
            playable.pause();
        }
    }

    pub fn resume(&mut self, id: TweenId) {
        if let Some(playable) = self.get_mut(id) {
            playable.resume();
        }
    }

    pub fn pause_all(&mut self) {
        for entry in &mut self.entries {
            entry.playable.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for entry in &mut self.entries {
            entry.playable.resume();
        }
    }

    /// Kill a root. The state flips now; on_kill runs when the root is
    /// evicted on the next tick.
    pub fn kill(&mut self, id: TweenId, trigger_callback: bool) {
        if let Some(playable) = self.get_mut(id) {
            playable.mark_killed(trigger_callback);
        }
    }

    pub fn kill_all(&mut self, trigger_callback: bool) {
        for entry in &mut self.entries {
            entry.playable.mark_killed(trigger_callback);
        }
    }

    /// Fast-forward a root to its end; it is evicted on the next tick.
    pub fn complete(&mut self, id: TweenId) {
        if let Some(playable) = self.get_mut(id) {
            playable.complete();
        }
    }

    pub fn state(&self, id: TweenId) -> Option<PlaybackState> {
        self.get(id).map(Playable::state)
    }

    pub fn contains(&self, id: TweenId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: TweenId) -> Option<&Playable> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.playable)
    }

    pub fn get_mut(&mut self, id: TweenId) -> Option<&mut Playable> {
        self.entries.iter_mut().find(|e| e.id == id).map(|e| &mut e.playable)
    }

    /// Ids of the registered roots, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any root is still playing.
    pub fn has_active(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.playable.state() == PlaybackState::Playing)
    }

    /// Advance every root by `dt` seconds, in registration order, then
    /// evict completed and killed roots.
    ///
    /// A negative or non-finite `dt` is rejected before anything changes.
    pub fn tick(&mut self, dt: f32) -> Result<TickReport, TweenError> {
        if let Err(err) = check_delta(dt) {
            log::warn!("tick rejected: {}", err);
            return Err(err);
        }
        self.apply_commands();

        let mut dt = dt * self.config.time_scale;
        if let Some(max) = self.config.max_delta {
            dt = dt.min(max);
        }

        let catch = self.config.catch_panics;
        let mut report = TickReport::default();
        // Registrations made during the tick go through the queue, so the
        // range below stays stable.
        for entry in self.entries.iter_mut() {
            advance_root(entry, dt, catch, &mut report);
        }

        self.evict(&mut report);
        self.apply_commands();
        Ok(report)
    }

    /// Kill every root (running on_kill) and drop pending requests.
    /// Returns how many roots were removed.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.shared.queue.borrow_mut().len();
        if dropped > 0 {
            log::debug!("shutdown dropped {} queued requests", dropped);
        }
        self.shared.queue.borrow_mut().clear();
        self.kill_all(true);
        let mut report = TickReport::default();
        self.evict(&mut report);
        report.completed.len() + report.killed.len()
    }

    fn evict(&mut self, report: &mut TickReport) {
        let catch = self.config.catch_panics;
        self.entries.retain_mut(|entry| match entry.playable.state() {
            PlaybackState::Completed => {
                log::debug!("evicting completed root {:?}", entry.id);
                report.completed.push(entry.id);
                false
            }
            PlaybackState::Killed => {
                log::debug!("evicting killed root {:?}", entry.id);
                if let Err(message) = guarded(catch, || entry.playable.flush_kill()) {
                    log::error!("on_kill panicked in root {:?}: {}", entry.id, message);
                    report.faults.push(CallbackFault {
                        id: entry.id,
                        message,
                    });
                }
                report.killed.push(entry.id);
                false
            }
            _ => true,
        });
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut *self.shared.queue.borrow_mut());
        for command in commands {
            match command {
                Command::Register(id, playable) => {
                    log::debug!("registered queued root {:?}", id);
                    self.entries.push(Entry { id, playable });
                }
                Command::Kill(id, trigger_callback) => self.kill(id, trigger_callback),
            }
        }
    }
}

/// Advance one root, recording a failure instead of aborting the tick.
fn advance_root(entry: &mut Entry, dt: f32, catch: bool, report: &mut TickReport) {
    match guarded(catch, || entry.playable.advance(dt)) {
        Ok(Ok(())) => report.advanced += 1,
        Ok(Err(err)) => {
            log::error!("root {:?} failed to advance: {}", entry.id, err);
            report.faults.push(CallbackFault {
                id: entry.id,
                message: err.to_string(),
            });
        }
        Err(message) => {
            log::error!("callback panicked in root {:?}: {}", entry.id, message);
            entry.playable.mark_killed(false);
            report.faults.push(CallbackFault {
                id: entry.id,
                message,
            });
        }
    }
}

/// Run `f`, turning a panic into its message when `catch` is set.
fn guarded<R>(catch: bool, f: impl FnOnce() -> R) -> Result<R, String> {
    if !catch {
        return Ok(f());
    }
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
