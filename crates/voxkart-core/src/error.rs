//! Error types for VOXKART
//!
//! Only construction and configuration can fail. Everything that happens
//! inside a tick is absorbed locally (clamped, skipped or logged).

use thiserror::Error;

/// Core VOXKART errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoxError {
    // Envelope errors
    #[error("Envelope capacity must be at least 1, got {0}")]
    InvalidEnvelopeCapacity(usize),

    #[error("Envelope sample interval must be finite and positive, got {0}")]
    InvalidSampleInterval(f32),

    // Wheel errors
    #[error("Invalid wheel {index}: {reason}")]
    InvalidWheel { index: usize, reason: String },

    #[error("Invalid torque curve: {0}")]
    InvalidCurve(String),

    // Controller errors
    #[error("Invalid controller configuration: {0}")]
    InvalidController(String),

    // Vocabulary errors
    #[error("Duplicate phrase in vocabulary: {0:?}")]
    DuplicatePhrase(String),

    #[error("Empty phrase in vocabulary")]
    EmptyPhrase,

    // Time errors
    #[error("Timestep must be finite and positive, got {0}")]
    InvalidTimestep(f32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for VOXKART operations
pub type VoxResult<T> = Result<T, VoxError>;
