//! Vehicle controller
//!
//! Subscribes to the command bus, folds every command into the driver
//! inputs, and once per fixed tick pushes those inputs into the wheels.
//! Steering is smoothed along the shortest arc toward
//! `steering * max_steer_angle_deg`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use voxkart_core::{clamp01, lerp_angle, CommandEvent, VoxError, VoxResult};
use voxkart_physics::Wheel;
use voxkart_voice::{CommandBus, SubscriptionId};

use crate::DriverInputs;

/// Controller configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Fraction of the remaining steering arc closed per second
    pub steering_smooth_speed: f32,
    /// Wheel yaw at full steering input, in degrees
    pub max_steer_angle_deg: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            steering_smooth_speed: 5.0,
            max_steer_angle_deg: 45.0,
        }
    }
}

impl ControllerConfig {
    /// Slower, gentler steering
    pub fn relaxed() -> Self {
        ControllerConfig {
            steering_smooth_speed: 2.5,
            max_steer_angle_deg: 30.0,
        }
    }

    pub fn validate(&self) -> VoxResult<()> {
        if !self.steering_smooth_speed.is_finite() || self.steering_smooth_speed < 0.0 {
            return Err(VoxError::InvalidController(format!(
                "steering_smooth_speed must be finite and non-negative, got {}",
                self.steering_smooth_speed
            )));
        }
        if !self.max_steer_angle_deg.is_finite()
            || !(0.0..=180.0).contains(&self.max_steer_angle_deg)
        {
            return Err(VoxError::InvalidController(format!(
                "max_steer_angle_deg must be in [0, 180], got {}",
                self.max_steer_angle_deg
            )));
        }
        Ok(())
    }
}

/// Controller statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Driving commands folded into the inputs
    pub commands_applied: u64,
    /// Commands received while disabled, or not meant for the vehicle
    pub commands_ignored: u64,
    /// Fixed ticks that pushed inputs into the wheels
    pub ticks: u64,
}

#[derive(Debug)]
struct ControllerState {
    inputs: DriverInputs,
    enabled: bool,
    stats: ControllerStats,
}

impl ControllerState {
    fn on_command(&mut self, event: &CommandEvent) {
        if !self.enabled {
            self.stats.commands_ignored += 1;
            return;
        }
        if self.inputs.apply(event) {
            self.stats.commands_applied += 1;
            trace!(
                command = %event.kind(),
                acceleration = self.inputs.acceleration,
                steering = self.inputs.steering,
                "inputs updated"
            );
        } else {
            self.stats.commands_ignored += 1;
        }
    }
}

/// Vehicle controller
///
/// Owns one bus subscription for its whole lifetime; dropping the
/// controller removes it.
#[derive(Debug)]
pub struct VehicleController {
    config: ControllerConfig,
    state: Arc<Mutex<ControllerState>>,
    bus: CommandBus,
    subscription: SubscriptionId,
}

impl VehicleController {
    /// Create an enabled controller listening on `bus`
    pub fn attach(bus: &CommandBus, config: ControllerConfig) -> VoxResult<Self> {
        config.validate()?;

        let state = Arc::new(Mutex::new(ControllerState {
            inputs: DriverInputs::NEUTRAL,
            enabled: true,
            stats: ControllerStats::default(),
        }));

        let handler_state = Arc::clone(&state);
        let subscription = bus.subscribe(move |event| handler_state.lock().on_command(event));
        debug!(subscription = subscription.0, "vehicle controller attached");

        Ok(VehicleController {
            config,
            state,
            bus: bus.clone(),
            subscription,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Enable or disable. Accumulated inputs are kept either way.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        if state.enabled != enabled {
            state.enabled = enabled;
            debug!(enabled, "vehicle controller toggled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Snapshot of the accumulated inputs
    pub fn inputs(&self) -> DriverInputs {
        self.state.lock().inputs
    }

    /// Return both inputs to neutral, for an explicit restart
    pub fn reset_inputs(&self) {
        self.state.lock().inputs = DriverInputs::NEUTRAL;
    }

    /// Wheel yaw the steering is currently heading for
    pub fn target_steer_angle(&self) -> f32 {
        self.inputs().steering * self.config.max_steer_angle_deg
    }

    pub fn stats(&self) -> ControllerStats {
        self.state.lock().stats
    }

    /// Push inputs into the wheels for one fixed tick.
    /// Returns false, touching nothing, while disabled.
    pub fn fixed_update(&self, wheels: &mut [Wheel], dt: f32) -> bool {
        let inputs = {
            let mut state = self.state.lock();
            if !state.enabled {
                return false;
            }
            state.stats.ticks += 1;
            state.inputs
        };

        let target = inputs.steering * self.config.max_steer_angle_deg;
        let blend = if dt.is_finite() {
            clamp01(dt * self.config.steering_smooth_speed)
        } else {
            0.0
        };

        for wheel in wheels.iter_mut() {
            wheel.set_acceleration(inputs.acceleration);
            if wheel.is_steerable() {
                wheel.set_steer_yaw(lerp_angle(wheel.steer_yaw(), target, blend));
            }
        }
        true
    }
}

impl Drop for VehicleController {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
        debug!(subscription = self.subscription.0, "vehicle controller detached");
    }
}
