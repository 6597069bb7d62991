//! # LaserKit Core
//!
//! Core types and utilities for LaserKit: the G-Code command model, the
//! modal state interpreter, 2D geometry helpers, progress reporting, and
//! cooperative cancellation. The travel optimizer and stream normalizer
//! live in `laserkit-optimizer` and build on these abstractions.

pub mod cancel;
pub mod command;
pub mod error;
pub mod geometry;
pub mod progress;
pub mod state;

pub use cancel::CancelToken;
pub use command::GcodeCommand;
pub use error::{GcodeError, Result};
pub use geometry::{distance_sqr, Point};
pub use progress::{NullReporter, ProgressReporter, SharedProgress};
pub use state::{ModalState, TrackedValue};

/// Parse a multi-line G-Code program into commands, skipping blank lines.
pub fn parse_program(source: &str) -> Result<Vec<GcodeCommand>> {
    let commands: Vec<GcodeCommand> = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(GcodeCommand::parse)
        .collect::<Result<_>>()?;
    tracing::debug!(commands = commands.len(), "parsed program");
    Ok(commands)
}
