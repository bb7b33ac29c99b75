//! VOXKART Test Harness - Simulation and scenario testing
//!
//! This crate provides:
//! - A deterministic rigid-body world over flat ground
//! - Seeded loudness generators standing in for a microphone
//! - A scenario builder: session, world, loudness and a phrase script
//! - End-to-end drive scenarios

pub mod integration;
pub mod loudness;
pub mod scenario;
pub mod world;

pub use integration::*;
pub use loudness::*;
pub use scenario::*;
pub use world::*;
