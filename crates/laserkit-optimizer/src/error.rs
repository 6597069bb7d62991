//! Error types for the optimizer crate.

use laserkit_core::GcodeError;
use thiserror::Error;

/// Errors that can abort an optimization or normalization run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// The run was cancelled through its [`laserkit_core::CancelToken`].
    /// The input list is left untouched.
    #[error("Optimization cancelled")]
    Cancelled,

    /// A command could not be parsed or modally resolved.
    #[error(transparent)]
    Gcode(#[from] GcodeError),
}

/// Result type alias for optimizer operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;
