// playback.rs
//
// Lifecycle pieces shared by tweens and sequences: playback state, loop
// bookkeeping, delay/time-scale handling and user callbacks.

use serde::{Deserialize, Serialize};

/// Where a tween or sequence is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Configured but never played.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Ran to the end. Terminal until played again.
    Completed,
    /// Cancelled. Terminal until played again.
    Killed,
}

impl PlaybackState {
    /// Completed or Killed.
    pub fn is_finished(self) -> bool {
        matches!(self, PlaybackState::Completed | PlaybackState::Killed)
    }
}

/// How many legs a tween runs before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopCount {
    /// Exactly N legs (N >= 1). `Finite(1)` plays once.
    Finite(u32),
    Infinite,
}

impl Default for LoopCount {
    fn default() -> Self {
        LoopCount::Finite(1)
    }
}

impl From<u32> for LoopCount {
    fn from(n: u32) -> Self {
        LoopCount::Finite(n)
    }
}

/// What happens when a leg ends and more legs remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Jump back to the start value.
    #[default]
    Restart,
    /// Reverse direction (ping-pong).
    Yoyo,
}

/// Leg counter and current direction.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoopCursor {
    pub count: LoopCount,
    pub mode: LoopMode,
    completed: u32,
    forward: bool,
    final_leg: bool,
}

impl LoopCursor {
    /// Rewind to the first leg. A reversed cursor replays the legs back to
    /// front, so it starts in the opposite direction of the last leg.
    pub fn reset(&mut self, reversed: bool) {
        self.completed = 0;
        self.final_leg = false;
        self.forward = if reversed { !self.last_leg_forward() } else { true };
    }

    fn last_leg_forward(&self) -> bool {
        match (self.mode, self.count) {
            (LoopMode::Yoyo, LoopCount::Finite(n)) => n % 2 == 1,
            _ => true,
        }
    }

    /// Close the current leg. Returns true when another leg follows.
    pub fn next_leg(&mut self) -> bool {
        self.completed = self.completed.saturating_add(1);
        let more = !self.final_leg
            && match self.count {
                LoopCount::Finite(n) => self.completed < n,
                LoopCount::Infinite => true,
            };
        if more && self.mode == LoopMode::Yoyo {
            self.forward = !self.forward;
        }
        more
    }

    /// Pass over the whole legs that `active` seconds cover in one go, so a
    /// huge delta costs the same as a small one. The leg that `active` ends
    /// in, and the final leg of a finite count, are left to run normally.
    /// Must be called at the start of a leg. Returns the time left over.
    pub fn skip_whole_legs(&mut self, active: f32, leg: f32) -> f32 {
        if self.final_leg || leg <= 0.0 || active <= leg {
            return active;
        }
        // `as` saturates, so huge deltas clamp to u32::MAX legs.
        let wanted = ((active / leg).ceil() - 1.0) as u32;
        let skip = match self.count {
            LoopCount::Finite(n) => wanted.min(n.saturating_sub(self.completed.saturating_add(1))),
            LoopCount::Infinite => wanted,
        };
        if skip == 0 {
            return active;
        }
        self.completed = self.completed.saturating_add(skip);
        if self.mode == LoopMode::Yoyo && skip % 2 == 1 {
            self.forward = !self.forward;
        }
        let rest = active - skip as f32 * leg;
        if rest <= 0.0 {
            // Rounding on a huge delta; finish on a leg end.
            leg
        } else if skip < wanted {
            rest
        } else {
            rest.min(leg)
        }
    }

    /// Stop after the leg in progress, even when looping forever.
    pub fn finish_after_current(&mut self) {
        self.final_leg = true;
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Total leg count, `None` when infinite.
    pub fn legs(&self) -> Option<u32> {
        match self.count {
            LoopCount::Finite(n) => Some(n),
            LoopCount::Infinite => None,
        }
    }
}

/// Delay-before-start and time scale.
#[derive(Debug, Clone)]
pub(crate) struct Timing {
    pub delay: f32,
    pub time_scale: f32,
    delay_elapsed: f32,
    started: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            delay: 0.0,
            time_scale: 1.0,
            delay_elapsed: 0.0,
            started: false,
        }
    }
}

impl Timing {
    pub fn reset(&mut self, skip_delay: bool) {
        self.delay_elapsed = if skip_delay { self.delay } else { 0.0 };
        self.started = false;
    }

    /// Scale `dt` and eat into the delay first.
    ///
    /// Returns `None` while the delay is still running, otherwise the active
    /// time left over and whether the active phase began during this call.
    pub fn consume(&mut self, dt: f32) -> Option<(f32, bool)> {
        let scaled = dt * self.time_scale;
        if self.started {
            return Some((scaled, false));
        }
        self.delay_elapsed += scaled;
        if self.delay_elapsed < self.delay {
            return None;
        }
        let rest = self.delay_elapsed - self.delay;
        self.delay_elapsed = self.delay;
        self.started = true;
        Some((rest, true))
    }

    /// Jump over whatever delay is left. Returns true if this started the
    /// active phase.
    pub fn skip(&mut self) -> bool {
        self.delay_elapsed = self.delay;
        !std::mem::replace(&mut self.started, true)
    }
}

pub(crate) type Callback = Box<dyn FnMut()>;
pub(crate) type UpdateCallback = Box<dyn FnMut(f32)>;

/// User hooks. Kill notification may be deferred: `kill_pending` records
/// that on_kill still owes a call.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub on_start: Option<Callback>,
    pub on_update: Option<UpdateCallback>,
    pub on_complete: Option<Callback>,
    pub on_kill: Option<Callback>,
    kill_pending: bool,
}

impl Callbacks {
    pub fn start(&mut self) {
        if let Some(f) = self.on_start.as_mut() {
            f();
        }
    }

    pub fn update(&mut self, progress: f32) {
        if let Some(f) = self.on_update.as_mut() {
            f(progress);
        }
    }

    pub fn complete(&mut self) {
        if let Some(f) = self.on_complete.as_mut() {
            f();
        }
    }

    /// Fire on_kill if a kill left it owed.
    pub fn flush_kill(&mut self) {
        if std::mem::take(&mut self.kill_pending) {
            if let Some(f) = self.on_kill.as_mut() {
                f();
            }
        }
    }
}

/// State, timing, loops and callbacks bundled for one playable.
#[derive(Default)]
pub(crate) struct Control {
    pub state: PlaybackState,
    pub timing: Timing,
    pub loops: LoopCursor,
    pub callbacks: Callbacks,
}

impl Control {
    /// Back to Idle with all counters cleared.
    pub fn rewind(&mut self) {
        self.state = PlaybackState::Idle;
        self.timing.reset(false);
        self.loops.reset(false);
    }

    /// Enter Playing from the first leg. Reversed playback skips the delay,
    /// which belongs to the tail of a mirrored window.
    pub fn begin(&mut self, reversed: bool) {
        self.timing.reset(reversed);
        self.loops.reset(reversed);
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Flip to Killed without running on_kill yet. Returns false when
    /// already finished.
    pub fn mark_killed(&mut self, trigger_callback: bool) -> bool {
        if self.state.is_finished() {
            return false;
        }
        self.state = PlaybackState::Killed;
        self.callbacks.kill_pending = trigger_callback;
        true
    }

    pub fn finish(&mut self) {
        self.state = PlaybackState::Completed;
        self.callbacks.complete();
    }

    /// Time this playable occupies when placed on a timeline, given the
    /// length of one leg.
    pub fn span(&self, leg: f32) -> f32 {
        match self.loops.legs() {
            Some(n) => (self.timing.delay + leg * n as f32) / self.timing.time_scale,
            None => f32::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_keeps_direction() {
        let mut loops = LoopCursor {
            count: LoopCount::Finite(3),
            ..Default::default()
        };
        loops.reset(false);
        assert!(loops.next_leg());
        assert!(loops.forward());
        assert!(loops.next_leg());
        assert!(!loops.next_leg());
        assert_eq!(loops.completed(), 3);
    }

    #[test]
    fn yoyo_alternates() {
        let mut loops = LoopCursor {
            count: LoopCount::Finite(2),
            mode: LoopMode::Yoyo,
            ..Default::default()
        };
        loops.reset(false);
        assert!(loops.forward());
        assert!(loops.next_leg());
        assert!(!loops.forward());
        assert!(!loops.next_leg());
    }

    #[test]
    fn reversed_yoyo_starts_against_last_leg() {
        let mut loops = LoopCursor {
            count: LoopCount::Finite(3),
            mode: LoopMode::Yoyo,
            ..Default::default()
        };
        // forward legs: F B F, so reversed playback runs B F B
        loops.reset(true);
        assert!(!loops.forward());

        loops.count = LoopCount::Finite(2);
        loops.reset(true);
        assert!(loops.forward());
    }

    #[test]
    fn infinite_stops_on_final_leg() {
        let mut loops = LoopCursor {
            count: LoopCount::Infinite,
            ..Default::default()
        };
        loops.reset(false);
        for _ in 0..100 {
            assert!(loops.next_leg());
        }
        loops.finish_after_current();
        assert!(!loops.next_leg());
    }

    #[test]
    fn skipping_keeps_the_final_leg() {
        let mut loops = LoopCursor {
            count: LoopCount::Finite(5),
            ..Default::default()
        };
        loops.reset(false);
        assert!(loops.next_leg());
        // 10 s over 1 s legs, but only legs 2..4 may be passed over.
        let rest = loops.skip_whole_legs(10.0, 1.0);
        assert_eq!(loops.completed(), 4);
        assert!((rest - 7.0).abs() < 1e-6);
        assert!(!loops.next_leg());
    }

    #[test]
    fn skipping_tracks_yoyo_parity() {
        let mut loops = LoopCursor {
            count: LoopCount::Infinite,
            mode: LoopMode::Yoyo,
            ..Default::default()
        };
        loops.reset(false);
        let rest = loops.skip_whole_legs(3.5, 1.0);
        assert_eq!(loops.completed(), 3);
        assert!(!loops.forward());
        assert!((rest - 0.5).abs() < 1e-6);

        // Landing exactly on a leg end leaves that whole leg to run.
        let rest = loops.skip_whole_legs(2.0, 1.0);
        assert_eq!(loops.completed(), 4);
        assert!(loops.forward());
        assert_eq!(rest, 1.0);
    }

    #[test]
    fn skipping_huge_delta_leaves_at_most_one_leg() {
        let mut loops = LoopCursor {
            count: LoopCount::Infinite,
            ..Default::default()
        };
        loops.reset(false);
        let rest = loops.skip_whole_legs(1.0e8, 1.0);
        assert!(rest > 0.0 && rest <= 1.0);
        assert!(loops.completed() > 1_000_000);
    }

    #[test]
    fn delay_is_consumed_before_active_time() {
        let mut timing = Timing {
            delay: 0.5,
            ..Default::default()
        };
        assert_eq!(timing.consume(0.3), None);
        let (rest, began) = timing.consume(0.3).unwrap();
        assert!(began);
        assert!((rest - 0.1).abs() < 1e-6);
        assert_eq!(timing.consume(0.2), Some((0.2, false)));
    }

    #[test]
    fn time_scale_applies_to_delay() {
        let mut timing = Timing {
            delay: 1.0,
            time_scale: 2.0,
            ..Default::default()
        };
        let (rest, began) = timing.consume(0.75).unwrap();
        assert!(began);
        assert!((rest - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mark_killed_defers_callback() {
        use std::cell::Cell;
        use std::rc::Rc;

        let fired = Rc::new(Cell::new(0));
        let mut control = Control::default();
        let f = fired.clone();
        control.callbacks.on_kill = Some(Box::new(move || f.set(f.get() + 1)));
        control.begin(false);

        assert!(control.mark_killed(true));
        assert_eq!(fired.get(), 0);
        assert!(!control.mark_killed(true));
        control.callbacks.flush_kill();
        control.callbacks.flush_kill();
        assert_eq!(fired.get(), 1);
    }
}
