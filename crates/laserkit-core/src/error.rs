//! Error handling for LaserKit
//!
//! Provides structured error types for command parsing and modal state
//! interpretation. All error types use `thiserror` for ergonomic handling.

use thiserror::Error;

/// G-Code command error type
///
/// Represents errors raised while parsing a command line or while resolving
/// its modal state. Any of these aborts the whole optimization run; partial
/// output is never safe to use.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Invalid G-Code syntax
    #[error("Invalid syntax in '{line}': {reason}")]
    InvalidSyntax {
        /// The offending command text.
        line: String,
        /// The reason for the syntax error.
        reason: String,
    },

    /// Unknown or unsupported mode code
    #[error("Unknown mode code M{code} in '{line}'")]
    UnknownCode {
        /// The unresolvable M code.
        code: u16,
        /// The offending command text.
        line: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' in '{line}': {reason}")]
    InvalidParameter {
        /// The parameter letter.
        param: char,
        /// The offending command text.
        line: String,
        /// The reason the parameter is invalid.
        reason: String,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, GcodeError>;
