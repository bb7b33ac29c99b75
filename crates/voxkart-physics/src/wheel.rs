//! Wheel dynamics - per-wheel force model
//!
//! One call to [`Wheel::step`] per wheel per fixed tick. Within a step the
//! sub-order is fixed: suspension, lateral grip, drive.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;
use voxkart_core::{clamp01, clamp_unit, move_towards, wrap_degrees, VoxError, VoxResult};

use crate::{ForceMode, GroundProbe, Pose, RigidBody, TorqueCurve};

/// Below this throttle magnitude a powered wheel applies engine braking
pub const ENGINE_BRAKE_THRESHOLD: f32 = 0.1;

/// Wheel configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Label used in diagnostics
    pub name: String,
    /// Mount position in body space
    pub offset: Vec3,
    /// Mount yaw relative to the body, in degrees
    pub yaw_deg: f32,
    pub steerable: bool,
    pub powered: bool,

    // Suspension
    /// Spring length at rest; also the ground probe length
    pub rest_distance: f32,
    pub spring_strength: f32,
    pub spring_damper: f32,

    // Grip
    /// Fraction of sideways slip cancelled per tick: 0 skids freely, 1 grips fully
    pub grip_factor: f32,
    pub lateral_grip_strength: f32,

    // Drive
    pub max_torque: f32,
    /// Engine input change per second
    pub pedal_responsiveness: f32,
    pub engine_brake: f32,
    /// Speed at which the torque curve is evaluated at 1
    pub car_top_speed: f32,
    pub torque_curve: TorqueCurve,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            name: String::from("wheel"),
            offset: Vec3::ZERO,
            yaw_deg: 0.0,
            steerable: false,
            powered: false,
            rest_distance: 0.6,
            spring_strength: 100.0,
            spring_damper: 10.0,
            grip_factor: 0.5,
            lateral_grip_strength: 0.25,
            max_torque: 1500.0,
            pedal_responsiveness: 3.0,
            engine_brake: 0.3,
            car_top_speed: 30.0,
            torque_curve: TorqueCurve::default(),
        }
    }
}

impl WheelConfig {
    /// Steerable, unpowered wheel at `offset`
    pub fn steered(name: &str, offset: Vec3) -> Self {
        WheelConfig {
            name: name.to_string(),
            offset,
            steerable: true,
            ..WheelConfig::default()
        }
    }

    /// Powered, fixed wheel at `offset`
    pub fn driven(name: &str, offset: Vec3) -> Self {
        WheelConfig {
            name: name.to_string(),
            offset,
            powered: true,
            ..WheelConfig::default()
        }
    }

    /// Check the configuration of the wheel at `index`
    pub fn validate(&self, index: usize) -> VoxResult<()> {
        let invalid = |reason: String| VoxError::InvalidWheel { index, reason };

        let scalars = [
            ("rest_distance", self.rest_distance),
            ("spring_strength", self.spring_strength),
            ("spring_damper", self.spring_damper),
            ("grip_factor", self.grip_factor),
            ("lateral_grip_strength", self.lateral_grip_strength),
            ("max_torque", self.max_torque),
            ("pedal_responsiveness", self.pedal_responsiveness),
            ("engine_brake", self.engine_brake),
            ("car_top_speed", self.car_top_speed),
            ("yaw_deg", self.yaw_deg),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(format!("{} is not finite", field)));
            }
            if value < 0.0 && field != "yaw_deg" {
                return Err(invalid(format!("{} is negative ({})", field, value)));
            }
        }
        if !self.offset.is_finite() {
            return Err(invalid("offset is not finite".to_string()));
        }
        if self.rest_distance == 0.0 {
            return Err(invalid("rest_distance must be positive".to_string()));
        }
        if self.grip_factor > 1.0 {
            return Err(invalid(format!(
                "grip_factor must be in [0, 1], got {}",
                self.grip_factor
            )));
        }
        Ok(())
    }
}

/// What a wheel did during one step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelReport {
    /// Ground within rest distance
    pub grounded: bool,
    /// Probe hit distance
    pub hit_distance: Option<f32>,
    /// Spring force magnitude along the wheel up axis (acceleration units)
    pub suspension: f32,
    /// Grip acceleration along the wheel right axis
    pub lateral: f32,
    /// Drive force along the wheel forward axis (force units)
    pub drive: f32,
    pub engine_braking: bool,
}

impl WheelReport {
    pub fn airborne() -> Self {
        Self::default()
    }
}

/// A wheel: configuration plus the state carried across ticks
#[derive(Clone, Debug)]
pub struct Wheel {
    config: WheelConfig,
    /// Local yaw in degrees, stored in [0, 360)
    steer_yaw: f32,
    /// Smoothed throttle, persists across ticks
    engine_input: f32,
    /// Throttle requested this tick
    acceleration_input: f32,
}

impl Wheel {
    pub fn new(config: WheelConfig) -> Self {
        Wheel {
            steer_yaw: wrap_degrees(config.yaw_deg),
            config,
            engine_input: 0.0,
            acceleration_input: 0.0,
        }
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_steerable(&self) -> bool {
        self.config.steerable
    }

    pub fn is_powered(&self) -> bool {
        self.config.powered
    }

    /// Set the throttle for the coming ticks. Ignored by the force model
    /// unless the wheel is powered.
    pub fn set_acceleration(&mut self, input: f32) {
        self.acceleration_input = clamp_unit(input);
    }

    pub fn acceleration_input(&self) -> f32 {
        self.acceleration_input
    }

    pub fn engine_input(&self) -> f32 {
        self.engine_input
    }

    /// Local yaw in degrees, in [0, 360)
    pub fn steer_yaw(&self) -> f32 {
        self.steer_yaw
    }

    pub fn set_steer_yaw(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.steer_yaw = wrap_degrees(degrees);
        }
    }

    /// World pose of the wheel mount for a given body pose
    pub fn pose(&self, body: &Pose) -> Pose {
        body.compose(
            self.config.offset,
            Quat::from_rotation_y(self.steer_yaw.to_radians()),
        )
    }

    /// Run one fixed tick of the force model
    pub fn step<B, G>(&mut self, body: &mut B, ground: &G, dt: f32) -> WheelReport
    where
        B: RigidBody + ?Sized,
        G: GroundProbe + ?Sized,
    {
        let body_pose = body.pose();
        let pose = self.pose(&body_pose);
        let down = -pose.up();

        let Some(hit) = ground.raycast(pose.position, down, self.config.rest_distance) else {
            trace!(wheel = %self.config.name, "no ground contact");
            return WheelReport::airborne();
        };
        trace!(wheel = %self.config.name, hit, "ground contact");

        let mut report = WheelReport {
            grounded: true,
            hit_distance: Some(hit),
            ..WheelReport::default()
        };

        report.suspension = self.apply_suspension(body, &pose, hit);
        report.lateral = self.apply_grip(body, &pose, dt);
        if self.config.powered {
            let (drive, braking) = self.apply_drive(body, &pose, &body_pose, dt);
            report.drive = drive;
            report.engine_braking = braking;
        }

        report
    }

    /// Damped spring along the wheel up axis
    fn apply_suspension<B: RigidBody + ?Sized>(&self, body: &mut B, pose: &Pose, hit: f32) -> f32 {
        let up = pose.up();
        let velocity = body.point_velocity(pose.position);

        let offset = self.config.rest_distance - hit;
        let velocity_up = up.dot(velocity);
        let force = offset * self.config.spring_strength - velocity_up * self.config.spring_damper;

        let contact = pose.position - up * hit;
        body.apply_force_at_point(up * force, contact, ForceMode::Acceleration);
        force
    }

    /// Cancel `grip_factor` of the sideways velocity within one tick
    fn apply_grip<B: RigidBody + ?Sized>(&self, body: &mut B, pose: &Pose, dt: f32) -> f32 {
        if !(dt.is_finite() && dt > 0.0) {
            return 0.0;
        }

        let right = pose.right();
        let velocity = body.point_velocity(pose.position);

        let lateral_velocity = right.dot(velocity);
        let desired_change = -lateral_velocity * self.config.grip_factor;
        let desired_acceleration = desired_change / dt;
        let applied = desired_acceleration * self.config.lateral_grip_strength;

        body.apply_force_at_point(right * applied, pose.position, ForceMode::Acceleration);
        applied
    }

    /// Throttle smoothing, torque curve, and engine braking
    fn apply_drive<B: RigidBody + ?Sized>(
        &mut self,
        body: &mut B,
        pose: &Pose,
        body_pose: &Pose,
        dt: f32,
    ) -> (f32, bool) {
        let max_step = if dt.is_finite() {
            self.config.pedal_responsiveness * dt
        } else {
            0.0
        };
        self.engine_input = clamp_unit(move_towards(
            self.engine_input,
            self.acceleration_input,
            max_step,
        ));

        let linear_velocity = body.linear_velocity();
        let speed = body_pose.forward().dot(linear_velocity);
        let normalized = if self.config.car_top_speed > 0.0 {
            clamp01(speed.abs() / self.config.car_top_speed)
        } else {
            1.0
        };

        let torque_factor = self.config.torque_curve.evaluate(normalized);
        let drive = self.config.max_torque * torque_factor * self.engine_input;
        body.apply_force_at_point(pose.forward() * drive, pose.position, ForceMode::Force);

        let braking = self.acceleration_input.abs() < ENGINE_BRAKE_THRESHOLD;
        if braking {
            body.apply_force(-linear_velocity * self.config.engine_brake, ForceMode::Acceleration);
        }

        (drive, braking)
    }
}
