//! Checkpoint error types.

use crate::controller::Phase;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint does not fit the controller's machine
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),

    #[error("Cannot restore a checkpoint in the {0:?} phase")]
    Busy(Phase),

    #[error("No state has been marked")]
    NothingMarked,
}
