// sequence.rs
//
// Ordered/parallel composition of tweens and nested sequences.
// Each entry gets an absolute offset when it is inserted; advancing the
// sequence moves one cursor and hands every entry the slice of time that
// falls inside its window.

use std::fmt;

use crate::error::{check_delta, TweenError};
use crate::playable::Playable;
use crate::playback::{Callback, Control, LoopCount, LoopMode, PlaybackState};

/// How a new entry is placed relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertMode {
    /// Start when the previous entry ends.
    Append,
    /// Start together with the previous entry.
    Join,
    /// Start at an absolute offset in seconds.
    At(f32),
}

pub(crate) enum EntryKind {
    Child(Playable),
    Callback(Callback),
    /// Empty time.
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryStatus {
    Pending,
    Running,
    Done,
}

struct Entry {
    offset: f32,
    span: f32,
    kind: EntryKind,
    status: EntryStatus,
    /// Sequence time already handed to this entry in the current leg.
    fed: f32,
}

impl Entry {
    fn rewind(&mut self) {
        self.status = EntryStatus::Pending;
        self.fed = 0.0;
        if let EntryKind::Child(child) = &mut self.kind {
            child.rewind();
        }
    }
}

/// A timeline of playables sharing one lifecycle.
///
/// Built with [`create_sequence`](crate::create_sequence).
pub struct Sequence {
    entries: Vec<Entry>,
    prev_offset: f32,
    prev_end: f32,
    duration: f32,
    cursor: f32,
    pub(crate) control: Control,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            prev_offset: 0.0,
            prev_end: 0.0,
            duration: 0.0,
            cursor: 0.0,
            control: Control::default(),
        }
    }

    /// Place an entry and return its offset.
    pub(crate) fn insert(&mut self, mode: InsertMode, kind: EntryKind, span: f32) -> f32 {
        let offset = match mode {
            InsertMode::Append => self.prev_end,
            InsertMode::Join => self.prev_offset,
            InsertMode::At(t) => t,
        };
        self.prev_offset = offset;
        self.prev_end = offset + span;
        self.duration = self.duration.max(offset + span);
        self.entries.push(Entry {
            offset,
            span,
            kind,
            status: EntryStatus::Pending,
            fed: 0.0,
        });
        offset
    }

    /// Check every child can play.
    pub fn validate(&self) -> Result<(), TweenError> {
        for entry in &self.entries {
            if let EntryKind::Child(child) = &entry.kind {
                child.validate()?;
            }
        }
        Ok(())
    }

    /// Start (or restart) from the beginning; children read their start
    /// values again when reached.
    pub fn play(&mut self) -> Result<(), TweenError> {
        if let Err(err) = self.validate() {
            log::warn!("refusing to play sequence: {}", err);
            return Err(err);
        }
        self.clear_capture();
        self.start(false);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.control.pause();
    }

    pub fn resume(&mut self) {
        self.control.resume();
    }

    /// Cancel the sequence and, silently, every child.
    pub fn kill(&mut self, trigger_callback: bool) {
        if self.mark_killed(trigger_callback) {
            self.control.callbacks.flush_kill();
        }
    }

    pub fn advance(&mut self, dt: f32) -> Result<(), TweenError> {
        check_delta(dt)?;
        if self.control.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some((active, began)) = self.control.timing.consume(dt) else {
            return Ok(());
        };
        if began {
            self.control.callbacks.start();
        }
        self.run(active)
    }

    /// Drive every remaining entry to its end, firing the callbacks that
    /// would have fired. Infinite loops finish the leg in progress.
    pub fn complete(&mut self) {
        if matches!(self.control.state, PlaybackState::Idle) || self.control.state.is_finished() {
            return;
        }
        if self.control.timing.skip() {
            self.control.callbacks.start();
        }
        if self.control.loops.count == LoopCount::Infinite {
            self.control.loops.finish_after_current();
        }
        loop {
            // Children are already validated and fed non-negative deltas.
            if let Err(err) = self.drive(self.duration) {
                log::warn!("sequence child rejected fast-forward: {}", err);
            }
            self.cursor = self.duration;
            self.control.callbacks.update(1.0);
            if self.control.loops.next_leg() {
                self.rewind_entries();
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

    /// Length of one leg: the latest end among all entries.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Position of the cursor within the current leg.
    pub fn elapsed(&self) -> f32 {
        self.cursor
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            if self.control.state == PlaybackState::Completed { 1.0 } else { 0.0 }
        } else {
            (self.cursor / self.duration).clamp(0.0, 1.0)
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

    pub fn span(&self) -> f32 {
        self.control.span(self.duration)
    }

    /// Number of entries, intervals and callbacks included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The playable at entry `index`, if that entry is one.
    pub fn child(&self, index: usize) -> Option<&Playable> {
        match &self.entries.get(index)?.kind {
            EntryKind::Child(child) => Some(child),
            _ => None,
        }
    }

    /// Absolute start offset of entry `index`.
    pub fn offset(&self, index: usize) -> Option<f32> {
        self.entries.get(index).map(|e| e.offset)
    }

    // -- Internals shared with Playable --

    pub(crate) fn start(&mut self, reversed: bool) {
        self.cursor = 0.0;
        self.rewind_entries();
        self.control.begin(reversed);
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = 0.0;
        self.rewind_entries();
        self.control.rewind();
    }

    pub(crate) fn clear_capture(&mut self) {
        for entry in &mut self.entries {
            if let EntryKind::Child(child) = &mut entry.kind {
                child.clear_capture();
            }
        }
    }

    pub(crate) fn mark_killed(&mut self, trigger_callback: bool) -> bool {
        if !self.control.mark_killed(trigger_callback) {
            return false;
        }
        for entry in &mut self.entries {
            if let EntryKind::Child(child) = &mut entry.kind {
                child.mark_killed(false);
            }
        }
        true
    }

    fn rewind_entries(&mut self) {
        for entry in &mut self.entries {
            entry.rewind();
        }
    }

    /// Spend `active` seconds of cursor time, carrying leftovers across legs.
    fn run(&mut self, mut active: f32) -> Result<(), TweenError> {
        loop {
            let room = self.duration - self.cursor;
            let target = if active >= room {
                active -= room;
                self.duration
            } else {
                let t = self.cursor + active;
                active = 0.0;
                t
            };
            self.drive(target)?;
            self.cursor = target;
            let progress = if self.duration > 0.0 { self.cursor / self.duration } else { 1.0 };
            self.control.callbacks.update(progress);

            if self.cursor < self.duration {
                return Ok(());
            }
            if self.control.loops.next_leg() {
                log::debug!("sequence leg {} done, looping", self.control.loops.completed());
                self.rewind_entries();
                self.cursor = 0.0;
                if active <= 0.0 || self.duration <= 0.0 {
                    return Ok(());
                }
                active = self.control.loops.skip_whole_legs(active, self.duration);
            } else {
                self.control.finish();
                return Ok(());
            }
        }
    }

    /// Move the cursor to `target`, starting, advancing and closing entries
    /// whose window the move touches. Backward legs mirror every window.
    fn drive(&mut self, target: f32) -> Result<(), TweenError> {
        let forward = self.control.loops.forward();
        let duration = self.duration;
        for entry in &mut self.entries {
            if entry.status == EntryStatus::Done {
                continue;
            }
            let start = if forward {
                entry.offset
            } else {
                duration - entry.offset - entry.span
            };
            if target < start {
                continue;
            }
            let end = start + entry.span;

            match &mut entry.kind {
                EntryKind::Callback(f) => {
                    f();
                    entry.status = EntryStatus::Done;
                }
                EntryKind::Interval => {
                    if target >= end {
                        entry.status = EntryStatus::Done;
                    }
                }
                EntryKind::Child(child) => {
                    if entry.status == EntryStatus::Pending {
                        child.start(!forward);
                        entry.status = EntryStatus::Running;
                    }
                    let local = target.min(end) - start;
                    let step = (local - entry.fed).max(0.0);
                    entry.fed = local;
                    child.advance(step)?;

                    if target >= end {
                        // A big jump or float slop must never drop a completion.
                        if !child.state().is_finished() {
                            child.complete();
                        }
                        entry.status = EntryStatus::Done;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("state", &self.control.state)
            .field("entries", &self.entries.len())
            .field("duration", &self.duration)
            .field("cursor", &self.cursor)
            .field("loops", &self.control.loops.count)
            .finish_non_exhaustive()
    }
}
