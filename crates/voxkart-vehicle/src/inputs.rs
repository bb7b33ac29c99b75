//! Driver inputs - the two scalars voice commands accumulate into

use voxkart_core::{clamp_unit, CommandEvent, CommandKind};

/// Steering moves at half the command intensity so a coarse voice signal
/// never produces a full-lock turn in one command
pub const STEERING_INTENSITY_SCALE: f32 = 0.5;

/// Throttle and steering, both in [-1, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriverInputs {
    /// -1 full reverse, 1 full throttle
    pub acceleration: f32,
    /// -1 full left, 1 full right
    pub steering: f32,
}

impl DriverInputs {
    pub const NEUTRAL: DriverInputs = DriverInputs {
        acceleration: 0.0,
        steering: 0.0,
    };

    /// Apply one command. Returns false for commands that do not drive
    /// the vehicle.
    pub fn apply(&mut self, event: &CommandEvent) -> bool {
        let intensity = event.intensity();
        match event.kind() {
            CommandKind::Accelerate => self.acceleration += intensity,
            CommandKind::Brake => self.acceleration -= intensity,
            CommandKind::Left => self.steering -= intensity * STEERING_INTENSITY_SCALE,
            CommandKind::Right => self.steering += intensity * STEERING_INTENSITY_SCALE,
            CommandKind::Straight => self.steering = 0.0,
            CommandKind::Stop => self.acceleration = 0.0,
            CommandKind::Pause => return false,
        }

        self.acceleration = clamp_unit(self.acceleration);
        self.steering = clamp_unit(self.steering);
        true
    }
}
