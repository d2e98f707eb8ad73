//! The common playback contract of tweens and sequences.

use crate::error::TweenError;
use crate::playback::PlaybackState;
use crate::sequence::Sequence;
use crate::tween::Tween;

/// Anything the scheduler or a sequence can drive.
#[derive(Debug)]
pub enum Playable {
    Tween(Tween),
    Sequence(Sequence),
}

impl From<Tween> for Playable {
    fn from(tween: Tween) -> Self {
        Playable::Tween(tween)
    }
}

impl From<Sequence> for Playable {
    fn from(sequence: Sequence) -> Self {
        Playable::Sequence(sequence)
    }
}

impl Playable {
    pub fn validate(&self) -> Result<(), TweenError> {
        match self {
            Playable::Tween(t) => t.validate(),
            Playable::Sequence(s) => s.validate(),
        }
    }

    pub fn play(&mut self) -> Result<(), TweenError> {
        match self {
            Playable::Tween(t) => t.play(),
            Playable::Sequence(s) => s.play(),
        }
    }

    pub fn pause(&mut self) {
        match self {
            Playable::Tween(t) => t.pause(),
            Playable::Sequence(s) => s.pause(),
        }
    }

    pub fn resume(&mut self) {
        match self {
            Playable::Tween(t) => t.resume(),
            Playable::Sequence(s) => s.resume(),
        }
    }

    pub fn kill(&mut self, trigger_callback: bool) {
        match self {
            Playable::Tween(t) => t.kill(trigger_callback),
            Playable::Sequence(s) => s.kill(trigger_callback),
        }
    }

    pub fn advance(&mut self, dt: f32) -> Result<(), TweenError> {
        match self {
            Playable::Tween(t) => t.advance(dt),
            Playable::Sequence(s) => s.advance(dt),
        }
    }

    pub fn complete(&mut self) {
        match self {
            Playable::Tween(t) => t.complete(),
            Playable::Sequence(s) => s.complete(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        match self {
            Playable::Tween(t) => t.state(),
            Playable::Sequence(s) => s.state(),
        }
    }

    pub fn duration(&self) -> f32 {
        match self {
            Playable::Tween(t) => t.duration(),
            Playable::Sequence(s) => s.duration(),
        }
    }

    pub fn span(&self) -> f32 {
        match self {
            Playable::Tween(t) => t.span(),
            Playable::Sequence(s) => s.span(),
        }
    }

    pub fn as_tween(&self) -> Option<&Tween> {
        match self {
            Playable::Tween(t) => Some(t),
            Playable::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Playable::Sequence(s) => Some(s),
            Playable::Tween(_) => None,
        }
    }

    pub(crate) fn start(&mut self, reversed: bool) {
        match self {
            Playable::Tween(t) => t.start(reversed),
            Playable::Sequence(s) => s.start(reversed),
        }
    }

    pub(crate) fn rewind(&mut self) {
        match self {
            Playable::Tween(t) => t.rewind(),
            Playable::Sequence(s) => s.rewind(),
        }
    }

    pub(crate) fn clear_capture(&mut self) {
        match self {
            Playable::Tween(t) => t.clear_capture(),
            Playable::Sequence(s) => s.clear_capture(),
        }
    }

    /// Flip to Killed, leaving on_kill owed when `trigger_callback` is set.
    pub(crate) fn mark_killed(&mut self, trigger_callback: bool) -> bool {
        match self {
            Playable::Tween(t) => t.control.mark_killed(trigger_callback),
            Playable::Sequence(s) => s.mark_killed(trigger_callback),
        }
    }

    pub(crate) fn flush_kill(&mut self) {
        match self {
            Playable::Tween(t) => t.control.callbacks.flush_kill(),
            Playable::Sequence(s) => s.control.callbacks.flush_kill(),
        }
    }
}
