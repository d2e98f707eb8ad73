// builder.rs
//
// Declarative construction of tweens and sequences. Builders are consumed
// by each call and hand back an owned, still-mutable configuration until
// `build()` (or `play_on()`) finalizes it.
//
// Usage:
//   let tween = tween_property(get, set, Vec2::new(100.0, 0.0), 3.0)
//       .easing(Easing::InOutCubic)
//       .loops(2, LoopMode::Yoyo)
//       .build()?;
//
// Invalid options are caught when they are set; the first one is returned
// by `build()`.

use crate::easing::EasingCurve;
use crate::error::TweenError;
use crate::playable::Playable;
use crate::playback::{Callbacks, LoopCount, LoopMode};
use crate::scheduler::{Scheduler, TweenId};
use crate::sequence::{EntryKind, InsertMode, Sequence};
use crate::tween::{Getter, Setter, Track, Tween};
use crate::value::Lerp;

/// Tween over a setter, with the start value given up front.
pub fn tween_value<V: Lerp>(
    setter: impl FnMut(V) + 'static,
    start: V,
    end: V,
    duration: f32,
) -> TweenBuilder<V> {
    TweenBuilder::new(None, Box::new(setter), Some(start), end, duration)
}

/// Tween over a getter/setter pair. The start value is read from the getter
/// when the tween begins playing.
pub fn tween_property<V: Lerp>(
    getter: impl FnMut() -> V + 'static,
    setter: impl FnMut(V) + 'static,
    end: V,
    duration: f32,
) -> TweenBuilder<V> {
    TweenBuilder::new(Some(Box::new(getter)), Box::new(setter), None, end, duration)
}

/// Empty sequence builder.
pub fn create_sequence() -> SequenceBuilder {
    SequenceBuilder::new()
}

/// Shared options of tweens and sequences.
struct Common {
    easing: EasingCurve,
    delay: f32,
    time_scale: f32,
    loops: LoopCount,
    loop_mode: LoopMode,
    callbacks: Callbacks,
    error: Option<TweenError>,
}

impl Default for Common {
    fn default() -> Self {
        Self {
            easing: EasingCurve::default(),
            delay: 0.0,
            time_scale: 1.0,
            loops: LoopCount::Finite(1),
            loop_mode: LoopMode::Restart,
            callbacks: Callbacks::default(),
            error: None,
        }
    }
}

impl Common {
    fn fail(&mut self, err: TweenError) {
        log::debug!("builder option rejected: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn set_delay(&mut self, delay: f32) {
        if delay.is_finite() && delay >= 0.0 {
            self.delay = delay;
        } else {
            self.fail(TweenError::config(format!("delay must be finite and >= 0, got {}", delay)));
        }
    }

    fn set_time_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.time_scale = scale;
        } else {
            self.fail(TweenError::config(format!("time scale must be > 0, got {}", scale)));
        }
    }

    fn set_loops(&mut self, count: LoopCount, mode: LoopMode, duration: Option<f32>) {
        if count == LoopCount::Finite(0) {
            self.fail(TweenError::config("loop count must be at least 1"));
            return;
        }
        self.loops = count;
        self.loop_mode = mode;
        if let Some(duration) = duration {
            self.check_loops_against(duration);
        }
    }

    /// Looping needs a leg with some length to loop over.
    fn check_loops_against(&mut self, duration: f32) {
        if duration <= 0.0 && self.loops != LoopCount::Finite(1) {
            self.fail(TweenError::config(format!(
                "{:?} {:?} loops need a non-zero duration",
                self.loops, self.loop_mode
            )));
        }
    }

    fn apply_to(self, control: &mut crate::playback::Control) -> Result<(), TweenError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        control.timing.delay = self.delay;
        control.timing.time_scale = self.time_scale;
        control.loops.count = self.loops;
        control.loops.mode = self.loop_mode;
        control.callbacks = self.callbacks;
        Ok(())
    }
}

/// Configures one [`Tween`].
pub struct TweenBuilder<V: Lerp> {
    track: Track<V>,
    duration: f32,
    common: Common,
}

impl<V: Lerp> TweenBuilder<V> {
    fn new(
        getter: Option<Getter<V>>,
        setter: Setter<V>,
        start: Option<V>,
        end: V,
        duration: f32,
    ) -> Self {
        let mut common = Common::default();
        if !duration.is_finite() || duration < 0.0 {
            common.fail(TweenError::config(format!(
                "duration must be finite and >= 0, got {}",
                duration
            )));
        }
        Self {
            track: Track {
                getter,
                setter,
                explicit_start: start,
                start: None,
                end,
            },
            duration,
            common,
        }
    }

    /// Use an explicit start value instead of reading the target.
    pub fn from(mut self, start: V) -> Self {
        self.track.explicit_start = Some(start);
        self
    }

    pub fn easing(mut self, easing: impl Into<EasingCurve>) -> Self {
        self.common.easing = easing.into();
        self
    }

    /// Seconds to wait after play before interpolating.
    pub fn delay(mut self, seconds: f32) -> Self {
        self.common.set_delay(seconds);
        self
    }

    /// Number of legs and how consecutive legs connect.
    pub fn loops(mut self, count: impl Into<LoopCount>, mode: LoopMode) -> Self {
        self.common.set_loops(count.into(), mode, Some(self.duration));
        self
    }

    pub fn time_scale(mut self, scale: f32) -> Self {
        self.common.set_time_scale(scale);
        self
    }

    pub fn on_start(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_start = Some(Box::new(f));
        self
    }

    /// Called after every advance with the applied progress along
    /// start → end (eased, and mirrored on backward legs).
    pub fn on_update(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.common.callbacks.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_kill(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_kill = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<Tween, TweenError> {
        let mut tween = Tween::new(Box::new(self.track), self.duration);
        tween.easing = self.common.easing.clone();
        self.common.apply_to(&mut tween.control)?;
        tween.validate()?;
        Ok(tween)
    }

    /// Build, play and register on `scheduler`.
    pub fn play_on(self, scheduler: &mut Scheduler) -> Result<TweenId, TweenError> {
        scheduler.play(self.build()?.into())
    }
}

/// Configures one [`Sequence`].
pub struct SequenceBuilder {
    sequence: Sequence,
    common: Common,
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self {
            sequence: Sequence::new(),
            common: Common::default(),
        }
    }

    /// Run after the previous entry ends.
    pub fn append(self, playable: impl Into<Playable>) -> Self {
        self.push(InsertMode::Append, playable.into())
    }

    /// Run together with the previous entry.
    pub fn join(self, playable: impl Into<Playable>) -> Self {
        self.push(InsertMode::Join, playable.into())
    }

    /// Run at an absolute offset in seconds.
    pub fn insert(mut self, at: f32, playable: impl Into<Playable>) -> Self {
        if !at.is_finite() || at < 0.0 {
            self.common.fail(TweenError::config(format!("insert offset must be >= 0, got {}", at)));
            return self;
        }
        self.push(InsertMode::At(at), playable.into())
    }

    /// Empty time after the previous entry.
    pub fn append_interval(mut self, seconds: f32) -> Self {
        if !seconds.is_finite() || seconds < 0.0 {
            self.common.fail(TweenError::config(format!("interval must be >= 0, got {}", seconds)));
            return self;
        }
        self.sequence.insert(InsertMode::Append, EntryKind::Interval, seconds);
        self
    }

    /// Call `f` once when the previous entry ends.
    pub fn append_callback(mut self, f: impl FnMut() + 'static) -> Self {
        self.sequence
            .insert(InsertMode::Append, EntryKind::Callback(Box::new(f)), 0.0);
        self
    }

    /// Call `f` once when the cursor reaches `at`.
    pub fn insert_callback(mut self, at: f32, f: impl FnMut() + 'static) -> Self {
        if !at.is_finite() || at < 0.0 {
            self.common.fail(TweenError::config(format!("insert offset must be >= 0, got {}", at)));
            return self;
        }
        self.sequence
            .insert(InsertMode::At(at), EntryKind::Callback(Box::new(f)), 0.0);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.common.set_delay(seconds);
        self
    }

    /// Loops are checked against the sequence length when `build()` runs,
    /// since entries may still be added.
    pub fn loops(mut self, count: impl Into<LoopCount>, mode: LoopMode) -> Self {
        self.common.set_loops(count.into(), mode, None);
        self
    }

    pub fn time_scale(mut self, scale: f32) -> Self {
        self.common.set_time_scale(scale);
        self
    }

    pub fn on_start(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_start = Some(Box::new(f));
        self
    }

    /// Called after every advance with the cursor's linear progress.
    pub fn on_update(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.common.callbacks.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_kill(mut self, f: impl FnMut() + 'static) -> Self {
        self.common.callbacks.on_kill = Some(Box::new(f));
        self
    }

    pub fn build(mut self) -> Result<Sequence, TweenError> {
        self.common.check_loops_against(self.sequence.duration());
        self.common.apply_to(&mut self.sequence.control)?;
        Ok(self.sequence)
    }

    pub fn play_on(self, scheduler: &mut Scheduler) -> Result<TweenId, TweenError> {
        scheduler.play(self.build()?.into())
    }

    fn push(mut self, mode: InsertMode, playable: Playable) -> Self {
        let span = playable.span();
        if !span.is_finite() {
            self.common
                .fail(TweenError::config("infinitely looping entries cannot be sequenced"));
            return self;
        }
        if let Err(err) = playable.validate() {
            self.common.fail(err);
            return self;
        }
        self.sequence.insert(mode, EntryKind::Child(playable), span);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::playback::PlaybackState;

    #[test]
    fn options_are_applied() {
        let tween = tween_value(|_: f32| {}, 0.0, 1.0, 2.0)
            .easing(Easing::InOutCubic)
            .delay(0.5)
            .loops(3, LoopMode::Yoyo)
            .build()
            .unwrap();
        assert_eq!(tween.duration(), 2.0);
        assert_eq!(tween.delay(), 0.5);
        assert_eq!(tween.loops(), (LoopCount::Finite(3), LoopMode::Yoyo));
        assert!((tween.span() - 6.5).abs() < 1e-6);
        assert_eq!(tween.state(), PlaybackState::Idle);
    }

    #[test]
    fn negative_duration_is_a_configuration_error() {
        let result = tween_value(|_: f32| {}, 0.0, 1.0, -1.0).build();
        assert!(matches!(result, Err(TweenError::Configuration(_))));
    }

    #[test]
    fn looping_zero_duration_is_rejected() {
        let result = tween_value(|_: f32| {}, 0.0, 1.0, 0.0)
            .loops(2, LoopMode::Yoyo)
            .build();
        assert!(matches!(result, Err(TweenError::Configuration(_))));

        let result = tween_value(|_: f32| {}, 0.0, 1.0, 0.0)
            .loops(LoopCount::Infinite, LoopMode::Restart)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn first_error_wins() {
        let err = tween_value(|_: f32| {}, 0.0, 1.0, 1.0)
            .delay(-1.0)
            .time_scale(0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("delay"));
    }

    #[test]
    fn zero_loop_count_is_rejected() {
        assert!(tween_value(|_: f32| {}, 0.0, 1.0, 1.0)
            .loops(0, LoopMode::Restart)
            .build()
            .is_err());
    }

    #[test]
    fn from_overrides_getter() {
        let mut tween = tween_property(|| 50.0_f32, |_| {}, 100.0, 1.0)
            .from(0.0)
            .build()
            .unwrap();
        assert!(tween.play().is_ok());
    }

    #[test]
    fn infinite_child_cannot_be_sequenced() {
        let forever = tween_value(|_: f32| {}, 0.0, 1.0, 1.0)
            .loops(LoopCount::Infinite, LoopMode::Yoyo)
            .build()
            .unwrap();
        let result = create_sequence().append(forever).build();
        assert!(matches!(result, Err(TweenError::Configuration(_))));
    }

    #[test]
    fn looping_empty_sequence_is_rejected() {
        let result = create_sequence().loops(2, LoopMode::Restart).build();
        assert!(result.is_err());
    }

    #[test]
    fn sequence_span_includes_child_delay_and_loops() {
        let child = tween_value(|_: f32| {}, 0.0, 1.0, 1.0)
            .delay(0.5)
            .loops(2, LoopMode::Restart)
            .build()
            .unwrap();
        let seq = create_sequence()
            .append(child)
            .append_interval(1.0)
            .delay(1.0)
            .loops(2, LoopMode::Yoyo)
            .build()
            .unwrap();
        assert_eq!(seq.duration(), 3.5);
        assert!((seq.span() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn insert_rejects_negative_offset() {
        let tween = tween_value(|_: f32| {}, 0.0, 1.0, 1.0).build().unwrap();
        assert!(create_sequence().insert(-1.0, tween).build().is_err());
    }
}
