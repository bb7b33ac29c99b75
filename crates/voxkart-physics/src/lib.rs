//! VOXKART Physics - Raycast wheel model
//!
//! Each wheel is a ray cast from its mount along its local down axis. When
//! the ray touches ground within the rest distance, the wheel applies three
//! forces to the shared rigid body, in this order:
//! 1. Suspension: damped spring along the wheel up axis
//! 2. Lateral grip: cancels sideways slip in proportion to grip
//! 3. Drive: torque-curve-shaped force along the wheel forward axis,
//!    plus engine braking when there is no throttle
//!
//! The rigid body and the ground are external. They are reached only
//! through the [`RigidBody`] and [`GroundProbe`] capabilities, so the model
//! runs the same against a game engine or a deterministic test world.

pub mod body;
pub mod curve;
pub mod wheel;

pub use body::*;
pub use curve::*;
pub use wheel::*;

pub use glam::{Quat, Vec3};
