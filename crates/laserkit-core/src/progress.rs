//! Progress reporting
//!
//! The optimizer writes human-readable status text while it works; a UI (or
//! nothing at all) consumes it. The sink is injected, never a module-level
//! singleton, so concurrent optimizer invocations can own separate reporters
//! or deliberately share one behind an `Arc`.

use parking_lot::Mutex;
use std::sync::Arc;

/// Write-only sink for human-readable optimizer status.
///
/// Implementations must be cheap: the optimizer calls this from its hot loop
/// boundaries. There is no back-pressure and the optimizer never reads back.
pub trait ProgressReporter: Send + Sync {
    /// Replace the current status line.
    fn set_status_text(&self, text: &str);
}

/// Reporter that discards everything. The default when no UI is attached.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn set_status_text(&self, _text: &str) {}
}

/// Lock-guarded shared status line.
///
/// Clone (or wrap in an `Arc`) and hand one side to the optimizer and the
/// other to a display loop. Writes from multiple optimizer invocations
/// serialize on the mutex; this has no effect on tour correctness.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    text: Arc<Mutex<String>>,
}

impl SharedProgress {
    /// Create an empty shared status line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current status line.
    pub fn status_text(&self) -> String {
        self.text.lock().clone()
    }
}

impl ProgressReporter for SharedProgress {
    fn set_status_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_progress_roundtrip() {
        let progress = SharedProgress::new();
        let writer = progress.clone();
        writer.set_status_text("Optimizing - pathing");
        assert_eq!(progress.status_text(), "Optimizing - pathing");
    }
}
