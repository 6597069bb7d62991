//! Cooperative cancellation
//!
//! The optimizer is a blocking batch computation; aborting its thread could
//! leave caller-visible structures half-updated. Instead the caller hands in
//! a [`CancelToken`] and the optimizer polls it between atomic steps, bailing
//! out before any shared list is touched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shareable cancellation flag.
///
/// Cloning is cheap; all clones observe the same flag. Once cancelled, a
/// token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
