//! Fixed-step clock
//!
//! Converts variable frame time into a whole number of fixed physics
//! ticks. The remainder is carried to the next frame. Frames longer than
//! `max_frame_delta` are clamped so a stall never turns into a burst of
//! catch-up ticks.

use voxkart_core::{VoxError, VoxResult};

/// Fixed-step accumulator
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    timestep: f32,
    max_frame_delta: f32,
    accumulator: f32,
    /// Ticks produced since creation
    ticks: u64,
    /// Simulated seconds, `ticks * timestep`
    sim_time: f64,
}

impl FixedStepClock {
    pub fn new(timestep: f32, max_frame_delta: f32) -> VoxResult<Self> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(VoxError::InvalidTimestep(timestep));
        }
        if !max_frame_delta.is_finite() || max_frame_delta < timestep {
            return Err(VoxError::InvalidConfig(format!(
                "max_frame_delta ({}) must be at least the timestep ({})",
                max_frame_delta, timestep
            )));
        }
        Ok(FixedStepClock {
            timestep,
            max_frame_delta,
            accumulator: 0.0,
            ticks: 0,
            sim_time: 0.0,
        })
    }

    /// Frame delta as the clock will use it: negative or non-finite
    /// deltas count as zero, long ones are clamped.
    pub fn clamp_frame(&self, frame_dt: f32) -> f32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            0.0
        } else {
            frame_dt.min(self.max_frame_delta)
        }
    }

    /// Accumulate one frame and return how many fixed ticks are due
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += self.clamp_frame(frame_dt);

        let mut due = 0;
        while self.accumulator >= self.timestep {
            self.accumulator -= self.timestep;
            due += 1;
        }

        self.ticks += u64::from(due);
        self.sim_time = self.ticks as f64 * f64::from(self.timestep);
        due
    }

    /// Fraction of a tick waiting in the accumulator, in [0, 1)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.timestep
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn max_frame_delta(&self) -> f32 {
        self.max_frame_delta
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
