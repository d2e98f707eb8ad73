// tween.rs
//
// A single time-bounded interpolation of one value.
// Decoupled from any host: the target is reached only through the
// getter/setter closures a Track holds.
//
// Usage:
//   let mut tween = tween_value(move |v| x.set(v), 0.0, 10.0, 1.0).build()?;
//   tween.play()?;
//   tween.advance(dt)?;  // once per frame

use std::fmt;

use crate::easing::EasingCurve;
use crate::error::{check_delta, TweenError};
use crate::playback::{Control, LoopCount, LoopMode, PlaybackState};
use crate::value::Lerp;

pub(crate) type Getter<V> = Box<dyn FnMut() -> V>;
pub(crate) type Setter<V> = Box<dyn FnMut(V)>;

/// Type-erased start/end pair bound to a target.
pub(crate) trait Property {
    /// Resolve the start value (explicit, or read from the target).
    fn capture(&mut self);
    fn is_captured(&self) -> bool;
    /// Forget the captured start so the next play reads the target again.
    fn clear_capture(&mut self);
    /// Whether a start value can be resolved at all.
    fn can_resolve_start(&self) -> bool;
    /// Write `lerp(start, end, t)` to the target.
    fn apply(&mut self, t: f32);
}

/// Start/end values plus the accessors of one animated target.
pub(crate) struct Track<V: Lerp> {
    pub getter: Option<Getter<V>>,
    pub setter: Setter<V>,
    pub explicit_start: Option<V>,
    pub start: Option<V>,
    pub end: V,
}

impl<V: Lerp> Property for Track<V> {
    fn capture(&mut self) {
        self.start = match (&self.explicit_start, self.getter.as_mut()) {
            (Some(start), _) => Some(start.clone()),
            (None, Some(get)) => Some(get()),
            (None, None) => None,
        };
    }

    fn is_captured(&self) -> bool {
        self.start.is_some()
    }

    fn clear_capture(&mut self) {
        self.start = None;
    }

    fn can_resolve_start(&self) -> bool {
        self.explicit_start.is_some() || self.getter.is_some()
    }

    fn apply(&mut self, t: f32) {
        if self.start.is_none() {
            self.capture();
        }
        if let Some(start) = &self.start {
            let value = Lerp::lerp(start, &self.end, t);
            (self.setter)(value);
        }
    }
}

/// One interpolation task: start → end over `duration` seconds.
///
/// Built with [`tween_value`](crate::tween_value) or
/// [`tween_property`](crate::tween_property); starts [`Idle`](PlaybackState::Idle).
pub struct Tween {
    property: Box<dyn Property>,
    duration: f32,
    elapsed: f32,
    pub(crate) easing: EasingCurve,
    pub(crate) control: Control,
}

impl Tween {
    pub(crate) fn new(property: Box<dyn Property>, duration: f32) -> Self {
        Self {
            property,
            duration,
            elapsed: 0.0,
            easing: EasingCurve::default(),
            control: Control::default(),
        }
    }

    /// Check that the tween can play at all.
    pub fn validate(&self) -> Result<(), TweenError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TweenError::config(format!(
                "duration must be finite and >= 0, got {}",
                self.duration
            )));
        }
        if !self.property.can_resolve_start() {
            return Err(TweenError::config("no getter bound and no start value given"));
        }
        Ok(())
    }

    /// Start (or restart) from the beginning.
    ///
    /// Works from any state; pending loop state is discarded and the start
    /// value is read again. A misconfigured tween is left untouched.
    pub fn play(&mut self) -> Result<(), TweenError> {
        if let Err(err) = self.validate() {
            log::warn!("refusing to play tween: {}", err);
            return Err(err);
        }
        self.property.clear_capture();
        self.start(false);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.control.pause();
    }

    pub fn resume(&mut self) {
        self.control.resume();
    }

    /// Cancel. Idempotent; finished tweens are left as they are.
    pub fn kill(&mut self, trigger_callback: bool) {
        if self.control.mark_killed(trigger_callback) {
            self.control.callbacks.flush_kill();
        }
    }

    /// Advance by `dt` seconds. Does nothing unless Playing.
    pub fn advance(&mut self, dt: f32) -> Result<(), TweenError> {
        check_delta(dt)?;
        if self.control.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some((active, began)) = self.control.timing.consume(dt) else {
            return Ok(());
        };
        if began {
            self.begin_active();
        }
        self.run(active);
        Ok(())
    }

    /// Jump to the final value, firing every callback still owed.
    ///
    /// An infinitely looping tween finishes the leg in progress. Idle and
    /// finished tweens are left alone.
    pub fn complete(&mut self) {
        if matches!(self.control.state, PlaybackState::Idle) || self.control.state.is_finished() {
            return;
        }
        if self.control.timing.skip() {
            self.begin_active();
        }
        if self.control.loops.count == LoopCount::Infinite {
            self.control.loops.finish_after_current();
        }
        loop {
            self.elapsed = self.duration;
            self.apply_current();
            if self.control.loops.next_leg() {
                self.elapsed = 0.0;
            } else {
                self.control.finish();
                break;
            }
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.control.state
    }

    pub fn is_playing(&self) -> bool {
        self.control.state == PlaybackState::Playing
    }

    /// Seconds of one leg.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds into the current leg.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Linear progress through the current leg, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            if self.control.state == PlaybackState::Completed { 1.0 } else { 0.0 }
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn delay(&self) -> f32 {
        self.control.timing.delay
    }

    pub fn loops(&self) -> (LoopCount, LoopMode) {
        (self.control.loops.count, self.control.loops.mode)
    }

    pub fn completed_loops(&self) -> u32 {
        self.control.loops.completed()
    }

    /// Time occupied on a sequence timeline: delay plus every leg, divided
    /// by the time scale. Infinite when looping forever.
    pub fn span(&self) -> f32 {
        self.control.span(self.duration)
    }

    // -- Internals shared with Sequence --

    /// Rewind and enter Playing. A known start value is kept.
    pub(crate) fn start(&mut self, reversed: bool) {
        self.elapsed = 0.0;
        self.control.begin(reversed);
        if self.control.timing.delay <= 0.0 && !self.property.is_captured() {
            self.property.capture();
        }
    }

    /// Back to Idle, keeping the captured start value.
    pub(crate) fn rewind(&mut self) {
        self.elapsed = 0.0;
        self.control.rewind();
    }

    pub(crate) fn clear_capture(&mut self) {
        self.property.clear_capture();
    }

    fn begin_active(&mut self) {
        if !self.property.is_captured() {
            self.property.capture();
        }
        self.control.callbacks.start();
    }

    /// Spend `active` seconds of leg time, carrying leftovers across legs.
    fn run(&mut self, mut active: f32) {
        loop {
            let room = self.duration - self.elapsed;
            if active >= room {
                self.elapsed = self.duration;
                active -= room;
            } else {
                self.elapsed += active;
                active = 0.0;
            }
            self.apply_current();

            if self.elapsed < self.duration {
                break;
            }
            if self.control.loops.next_leg() {
                log::debug!("tween leg {} done, looping", self.control.loops.completed());
                self.elapsed = 0.0;
                if active <= 0.0 || self.duration <= 0.0 {
                    break;
                }
                active = self.control.loops.skip_whole_legs(active, self.duration);
            } else {
                self.control.finish();
                break;
            }
        }
    }

    fn apply_current(&mut self) {
        let t = if self.duration > 0.0 { self.elapsed / self.duration } else { 1.0 };
        let eased = self.easing.sample(t);
        let p = if self.control.loops.forward() { eased } else { 1.0 - eased };
        self.property.apply(p);
        self.control.callbacks.update(p);
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("state", &self.control.state)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("easing", &self.easing)
            .field("loops", &self.control.loops.count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{tween_property, tween_value};
    use crate::easing::Easing;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn probe() -> (Rc<Cell<f32>>, impl FnMut(f32) + 'static) {
        let cell = Rc::new(Cell::new(f32::NAN));
        let sink = cell.clone();
        (cell, move |v| sink.set(v))
    }

    #[test]
    fn linear_midpoint_and_end() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 100.0, 1.0).build().unwrap();
        tween.play().unwrap();

        tween.advance(0.5).unwrap();
        assert!((value.get() - 50.0).abs() < 0.01);
        assert_eq!(tween.state(), PlaybackState::Playing);

        tween.advance(0.5).unwrap();
        assert!((value.get() - 100.0).abs() < 0.01);
        assert_eq!(tween.state(), PlaybackState::Completed);
    }

    #[test]
    fn advance_before_play_is_noop() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 1.0, 1.0).build().unwrap();
        tween.advance(0.5).unwrap();
        assert!(value.get().is_nan());
        assert_eq!(tween.state(), PlaybackState::Idle);
    }

    #[test]
    fn negative_dt_is_rejected_without_side_effects() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 1.0, 1.0).build().unwrap();
        tween.play().unwrap();
        tween.advance(0.25).unwrap();
        let before = value.get();

        assert!(matches!(tween.advance(-0.1), Err(TweenError::InvalidTime(_))));
        assert_eq!(value.get(), before);
        assert!((tween.elapsed() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 3.0, 7.0, 0.0).build().unwrap();
        tween.play().unwrap();
        tween.advance(0.0).unwrap();
        assert_eq!(value.get(), 7.0);
        assert_eq!(tween.state(), PlaybackState::Completed);
        assert_eq!(tween.progress(), 1.0);
    }

    #[test]
    fn start_is_captured_at_play_not_construction() {
        let target = Rc::new(RefCell::new(1.0_f32));
        let (read, write) = (target.clone(), target.clone());
        let mut tween = tween_property(move || *read.borrow(), move |v| *write.borrow_mut() = v, 3.0, 1.0)
            .build()
            .unwrap();

        *target.borrow_mut() = 2.0;
        tween.play().unwrap();
        *target.borrow_mut() = 100.0;

        tween.advance(0.5).unwrap();
        assert!((*target.borrow() - 2.5).abs() < 1e-5);
    }

    #[test]
    fn delay_postpones_start_callback() {
        let started = Rc::new(Cell::new(0));
        let s = started.clone();
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .delay(0.5)
            .on_start(move || s.set(s.get() + 1))
            .build()
            .unwrap();
        tween.play().unwrap();

        tween.advance(0.4).unwrap();
        assert_eq!(started.get(), 0);
        assert!(value.get().is_nan());

        tween.advance(0.2).unwrap();
        assert_eq!(started.get(), 1);
        assert!((value.get() - 1.0).abs() < 1e-4);

        tween.advance(0.2).unwrap();
        assert_eq!(started.get(), 1);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0).build().unwrap();
        tween.play().unwrap();
        tween.advance(0.3).unwrap();

        tween.pause();
        tween.pause();
        assert_eq!(tween.state(), PlaybackState::Paused);
        tween.advance(5.0).unwrap();
        assert!((value.get() - 3.0).abs() < 1e-4);

        tween.resume();
        tween.advance(0.2).unwrap();
        assert!((value.get() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let (_, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0).build().unwrap();
        tween.resume();
        assert_eq!(tween.state(), PlaybackState::Idle);
    }

    #[test]
    fn kill_is_idempotent_and_optionally_notifies() {
        let killed = Rc::new(Cell::new(0));
        let k = killed.clone();
        let (_, set) = probe();
        let mut tween = tween_value(set, 0.0, 1.0, 1.0)
            .on_kill(move || k.set(k.get() + 1))
            .build()
            .unwrap();
        tween.play().unwrap();

        tween.kill(true);
        tween.kill(true);
        assert_eq!(tween.state(), PlaybackState::Killed);
        assert_eq!(killed.get(), 1);

        tween.play().unwrap();
        tween.kill(false);
        assert_eq!(killed.get(), 1);
    }

    #[test]
    fn restart_loop_carries_leftover_time() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(3, LoopMode::Restart)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(1.25).unwrap();
        assert!((value.get() - 2.5).abs() < 1e-4);
        assert_eq!(tween.completed_loops(), 1);
        tween.advance(2.0).unwrap();
        assert_eq!(tween.state(), PlaybackState::Completed);
        assert_eq!(value.get(), 10.0);
    }

    #[test]
    fn replay_cancels_pending_loops() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(2, LoopMode::Yoyo)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(1.5).unwrap();
        assert_eq!(tween.completed_loops(), 1);

        tween.play().unwrap();
        assert_eq!(tween.completed_loops(), 0);
        tween.advance(0.5).unwrap();
        assert!((value.get() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn complete_fast_forwards_yoyo_to_start() {
        let completed = Rc::new(Cell::new(0));
        let c = completed.clone();
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(2, LoopMode::Yoyo)
            .on_complete(move || c.set(c.get() + 1))
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(0.1).unwrap();

        tween.complete();
        assert_eq!(value.get(), 0.0);
        assert_eq!(tween.state(), PlaybackState::Completed);
        tween.complete();
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn complete_ends_infinite_loop_after_current_leg() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(LoopCount::Infinite, LoopMode::Restart)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(7.3).unwrap();
        tween.complete();
        assert_eq!(tween.state(), PlaybackState::Completed);
        assert_eq!(value.get(), 10.0);
    }

    #[test]
    fn huge_delta_on_infinite_loop_returns() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(LoopCount::Infinite, LoopMode::Restart)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(1.0e8).unwrap();
        assert_eq!(tween.state(), PlaybackState::Playing);
        assert!(tween.completed_loops() > 1_000_000);
        assert!((0.0..=10.0).contains(&value.get()));
    }

    #[test]
    fn many_legs_in_one_advance_keep_yoyo_direction() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 1.0)
            .loops(LoopCount::Infinite, LoopMode::Yoyo)
            .build()
            .unwrap();
        tween.play().unwrap();
        // Legs 1-3 pass, leg 4 (backward) is a quarter done.
        tween.advance(3.25).unwrap();
        assert_eq!(tween.completed_loops(), 3);
        assert!((value.get() - 7.5).abs() < 1e-3);
    }

    #[test]
    fn large_finite_count_completes_in_one_advance() {
        let (completed, on_complete) = {
            let count = Rc::new(Cell::new(0));
            let c = count.clone();
            (count, move || c.set(c.get() + 1))
        };
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 0.5)
            .loops(1_000_000, LoopMode::Yoyo)
            .on_complete(on_complete)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(1.0e7).unwrap();
        assert_eq!(tween.state(), PlaybackState::Completed);
        assert_eq!(completed.get(), 1);
        // Even leg count: ends on the start value.
        assert_eq!(value.get(), 0.0);
    }

    #[test]
    fn easing_shapes_progress() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 100.0, 1.0)
            .easing(Easing::InQuad)
            .build()
            .unwrap();
        tween.play().unwrap();
        tween.advance(0.5).unwrap();
        assert!((value.get() - 25.0).abs() < 0.01);
    }

    #[test]
    fn time_scale_speeds_up_playback() {
        let (value, set) = probe();
        let mut tween = tween_value(set, 0.0, 10.0, 2.0)
            .time_scale(2.0)
            .build()
            .unwrap();
        assert!((tween.span() - 1.0).abs() < 1e-6);
        tween.play().unwrap();
        tween.advance(0.5).unwrap();
        assert!((value.get() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn update_reports_each_advance() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let (_, set) = probe();
        let mut tween = tween_value(set, 0.0, 1.0, 1.0)
            .on_update(move |p| s.borrow_mut().push(p))
            .build()
            .unwrap();
        tween.play().unwrap();
        for _ in 0..4 {
            tween.advance(0.25).unwrap();
        }
        tween.advance(0.25).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(*seen.last().unwrap(), 1.0);
    }
}
