//! VOXKART Vehicle - Voice commands to wheel inputs
//!
//! This crate implements the vehicle side of the command bus:
//! - Driver inputs: accumulated, clamped throttle and steering scalars
//! - Vehicle controller: bus subscription, per-tick input broadcast,
//!   shortest-arc steering smoothing
//! - Vehicle: the ordered wheel set and its per-tick force pass

pub mod controller;
pub mod inputs;
pub mod vehicle;

pub use controller::*;
pub use inputs::*;
pub use vehicle::*;
