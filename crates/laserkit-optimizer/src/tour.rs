//! Grid-based nearest-neighbor tour builder
//!
//! Reorders a toolpath so the rapid travel between disjoint burn groups is
//! (greedily) minimized. Each step scans a bounded window of grid cells
//! around the current position for the closest unvisited group, falling back
//! to an exhaustive scan when the window is empty, then bridges to the
//! chosen group with a synthetic rapid move.
//!
//! The optimizer is tuned for toolpaths produced by vector conversion, where
//! many short disconnected strokes arrive in arbitrary order.

use crate::error::{OptimizeError, OptimizeResult};
use crate::grid::{CellKey, SpatialGrid};
use crate::grouping::{build_groups, CommandGroup, GroupBoundary};
use laserkit_core::{
    distance_sqr, CancelToken, GcodeCommand, NullReporter, Point, ProgressReporter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cell window half-extent scanned around the current position.
///
/// The scanned range is `max(0, g - SCAN_RANGE) .. g + SCAN_RANGE` per axis:
/// clamped at zero below and exclusive above, so the window is offset toward
/// positive coordinates rather than centered. Downstream output depends on
/// exactly this window, so it is kept as-is.
pub const SCAN_RANGE: i32 = 2;

/// Diagnostics from one tour-building run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TourStats {
    /// Number of burn groups visited.
    pub groups: usize,
    /// Selections satisfied by the bounded cell window.
    pub hits: usize,
    /// Selections that fell back to an exhaustive scan.
    pub misses: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Nearest-neighbor toolpath reorderer.
///
/// Configured with a grouping boundary, an injected progress reporter, and a
/// cooperative cancellation token; see [`PathOptimizer::optimize`].
pub struct PathOptimizer {
    boundary: GroupBoundary,
    reporter: Arc<dyn ProgressReporter>,
    cancel: CancelToken,
}

impl Default for PathOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PathOptimizer {
    /// Create an optimizer with the `PowerInactive` grouping boundary, no
    /// progress output, and no cancellation source.
    pub fn new() -> Self {
        Self {
            boundary: GroupBoundary::PowerInactive,
            reporter: Arc::new(NullReporter),
            cancel: CancelToken::new(),
        }
    }

    /// Choose which transition closes a burn group.
    pub fn with_boundary(mut self, boundary: GroupBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Attach a progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Attach a cancellation token, polled once per tour step.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reorder `commands` in place using the spatial grid.
    ///
    /// The list is cleared and rebuilt: every original command reappears
    /// exactly once, grouped and reordered, with synthetic bridging rapids
    /// between groups. On error (including cancellation) the input is left
    /// untouched.
    pub fn optimize(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<TourStats> {
        let started = Instant::now();

        self.reporter.set_status_text("Optimizing - generating paths");
        let groups = build_groups(commands, self.boundary)?;

        let (tour, mut stats) = self.route(groups)?;
        *commands = tour;

        stats.elapsed = started.elapsed();
        self.reporter.set_status_text(&format!(
            "Optimizing - elapsed: {}ms",
            stats.elapsed.as_millis()
        ));
        debug!(
            groups = stats.groups,
            hits = stats.hits,
            misses = stats.misses,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "tour complete"
        );
        Ok(stats)
    }

    /// Reorder `commands` in place with the gridless greedy variant.
    ///
    /// Functionally equivalent to [`optimize`](Self::optimize) but scans the
    /// full remaining-group list at every step: O(n^2), adequate for small
    /// inputs and useful as a correctness reference. Hit/miss counters stay
    /// zero since there is no window/fallback distinction.
    pub fn optimize_greedy(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<TourStats> {
        let started = Instant::now();

        self.reporter.set_status_text("Optimizing - generating paths");
        let groups = build_groups(commands, self.boundary)?;

        self.reporter.set_status_text("Optimizing - nearest neighbour");
        let mut remaining: Vec<Option<CommandGroup>> = groups.into_iter().map(Some).collect();
        let mut stats = TourStats {
            groups: remaining.len(),
            ..TourStats::default()
        };

        let mut out = Vec::with_capacity(commands.len());
        let mut current = Point::default();
        let mut left = remaining.len();
        while left > 0 {
            if self.cancel.is_cancelled() {
                return Err(OptimizeError::Cancelled);
            }

            let mut best: Option<usize> = None;
            let mut best_distance = 0.0;
            for (index, slot) in remaining.iter().enumerate() {
                if let Some(group) = slot {
                    let distance = distance_sqr(current, group.start());
                    if best.is_none() || distance < best_distance {
                        best = Some(index);
                        best_distance = distance;
                    }
                }
            }

            let Some(index) = best else { break };
            let Some(group) = remaining[index].take() else { break };
            left -= 1;

            current = group.end();
            if !out.is_empty() {
                out.push(GcodeCommand::rapid_to(group.start()));
            }
            out.extend(group.into_commands());
        }

        *commands = out;
        stats.elapsed = started.elapsed();
        self.reporter.set_status_text(&format!(
            "Optimizing - elapsed: {}ms",
            stats.elapsed.as_millis()
        ));
        Ok(stats)
    }

    /// Build the tour over pre-built groups, starting from the origin.
    ///
    /// Exposed so callers that already hold groups (or tests pinning the
    /// visiting order) can drive the selection loop directly. `elapsed` in
    /// the returned stats is left zero; the public entry points fill it.
    pub fn route(
        &self,
        groups: Vec<CommandGroup>,
    ) -> OptimizeResult<(Vec<GcodeCommand>, TourStats)> {
        self.reporter.set_status_text("Optimizing - generating grid");
        let mut slots: Vec<Option<CommandGroup>> = groups.into_iter().map(Some).collect();
        let mut grid = SpatialGrid::new();
        for (index, slot) in slots.iter().enumerate() {
            if let Some(group) = slot {
                grid.insert(index, group.start());
            }
        }

        let mut stats = TourStats {
            groups: grid.len(),
            ..TourStats::default()
        };

        self.reporter.set_status_text("Optimizing - nearest neighbour");
        let mut out = Vec::new();
        let mut current = Point::default();
        while !grid.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(OptimizeError::Cancelled);
            }

            let mut best: Option<usize> = None;
            let mut best_distance = 0.0;

            // Bounded window around the current cell. Cells are visited in
            // ascending x then y and cell contents in insertion order, so
            // ties resolve deterministically to the first candidate found.
            let key = CellKey::containing(current);
            for x in (key.x - SCAN_RANGE).max(0)..key.x + SCAN_RANGE {
                for y in (key.y - SCAN_RANGE).max(0)..key.y + SCAN_RANGE {
                    for &index in grid.cell(x, y) {
                        let Some(group) = slots[index].as_ref() else {
                            continue;
                        };
                        let distance = distance_sqr(current, group.start());
                        if best.is_none() || distance < best_distance {
                            best = Some(index);
                            best_distance = distance;
                        }
                    }
                }
            }

            // Sparse region: nothing inside the window, scan everything.
            if best.is_none() {
                stats.misses += 1;
                for (index, slot) in slots.iter().enumerate() {
                    if let Some(group) = slot {
                        let distance = distance_sqr(current, group.start());
                        if best.is_none() || distance < best_distance {
                            best = Some(index);
                            best_distance = distance;
                        }
                    }
                }
            } else {
                stats.hits += 1;
            }

            let Some(index) = best else { break };
            let Some(group) = slots[index].take() else { break };
            grid.remove(index, group.start());

            current = group.end();
            if !out.is_empty() {
                out.push(GcodeCommand::rapid_to(group.start()));
            }
            out.extend(group.into_commands());
        }

        Ok((out, stats))
    }
}
