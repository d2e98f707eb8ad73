use crate::error::{check_delta, TweenError};

/// Fixed timestep accumulator.
/// Turns variable frame times into a whole number of equal scheduler ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    step: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Most ticks handed out for one frame.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Result<Self, TweenError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(TweenError::config(format!("timestep must be > 0, got {}", step)));
        }
        Ok(Self {
            step,
            accumulator: 0.0,
            max_steps: 10,
        })
    }

    /// Cap on ticks per frame (at least 1).
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> Result<u32, TweenError> {
        check_delta(frame_dt)?;
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death
        let cap = self.step * self.max_steps as f32;
        if self.accumulator > cap {
            log::debug!("frame of {:.3}s dropped to {} steps", frame_dt, self.max_steps);
            self.accumulator = cap;
        }
        let steps = ((self.accumulator / self.step) as u32).min(self.max_steps);
        self.accumulator = (self.accumulator - steps as f32 * self.step).max(0.0);
        Ok(steps)
    }

    /// Fraction of a step left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}
