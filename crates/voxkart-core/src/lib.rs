//! VOXKART Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every VOXKART crate:
//! - Voice command kinds and command events
//! - Scalar and angle helpers used by fixed-tick smoothing
//! - The core error type

pub mod command;
pub mod error;
pub mod math;

pub use command::*;
pub use error::*;
pub use math::*;
