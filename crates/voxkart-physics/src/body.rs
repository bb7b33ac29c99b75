//! Rigid-body and physics-world capabilities
//!
//! Axis convention: +Y up, +Z forward, +X right. A positive yaw about +Y
//! turns +Z toward +X, so positive steering turns right.

use glam::{Quat, Vec3};

/// How a force is turned into motion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceMode {
    /// Divided by the body mass
    Force,
    /// Applied as an acceleration, mass is ignored
    Acceleration,
}

/// World-space position and orientation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Pose { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Pose {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Transform a point from this pose's local space to world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Compose a child pose given in this pose's local space
    pub fn compose(&self, local_offset: Vec3, local_rotation: Quat) -> Pose {
        Pose {
            position: self.transform_point(local_offset),
            rotation: self.rotation * local_rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The vehicle's rigid body as seen by the wheels
pub trait RigidBody {
    /// Current world pose of the body
    fn pose(&self) -> Pose;

    /// Linear velocity of the centre of mass
    fn linear_velocity(&self) -> Vec3;

    /// Velocity of a world-space point rigidly attached to the body
    fn point_velocity(&self, world_point: Vec3) -> Vec3;

    /// Apply a force at a world-space point (produces torque)
    fn apply_force_at_point(&mut self, force: Vec3, world_point: Vec3, mode: ForceMode);

    /// Apply a force at the centre of mass
    fn apply_force(&mut self, force: Vec3, mode: ForceMode);
}

/// Ground queries
pub trait GroundProbe {
    /// Distance along `direction` (unit length) to the first hit within
    /// `max_distance`, or `None`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32>;
}

/// A world that can run whole fixed ticks: one body, its ground, and an
/// integrator that consumes the forces applied during the tick
pub trait PhysicsWorld {
    type Body: RigidBody;
    type Ground: GroundProbe;

    /// Borrow the body mutably and the ground immutably for one tick
    fn split(&mut self) -> (&mut Self::Body, &Self::Ground);

    /// Integrate accumulated forces over `dt` and clear them
    fn integrate(&mut self, dt: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_axes() {
        let pose = Pose::IDENTITY;
        assert_eq!(pose.up(), Vec3::Y);
        assert_eq!(pose.right(), Vec3::X);
        assert_eq!(pose.forward(), Vec3::Z);
    }

    #[test]
    fn test_positive_yaw_turns_right() {
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(30f32.to_radians()));
        let fwd = pose.forward();
        assert!(fwd.x > 0.0);
        assert!(fwd.z > 0.0);
    }

    #[test]
    fn test_compose() {
        let body = Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(90f32.to_radians()));
        let wheel = body.compose(Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY);
        // Body forward is +X after a 90 degree yaw
        assert!((wheel.position - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }
}
