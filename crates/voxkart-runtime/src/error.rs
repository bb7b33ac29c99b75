//! Session errors

use std::io;

use thiserror::Error;
use voxkart_core::VoxError;

/// Errors raised while building a drive session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session configuration: {0}")]
    Config(#[from] VoxError),

    #[error("Failed to parse session configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read session configuration: {0}")]
    Io(#[from] io::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
