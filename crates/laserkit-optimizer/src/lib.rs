//! # LaserKit Optimizer
//!
//! Travel-distance optimization and power-stream normalization for laser
//! toolpaths, tuned for the G-Code produced by vector conversion: many short
//! disconnected strokes in arbitrary order, with power intent that may be
//! implicit or redundant.
//!
//! ## Components
//!
//! - **Grouping**: partition a command stream into burn groups bounded by
//!   power-off transitions.
//! - **Spatial Grid**: bucket index over group start points for
//!   bounded-radius nearest-neighbor lookup.
//! - **Tour Builder**: greedy nearest-neighbor reordering of burn groups,
//!   grid-windowed with an exhaustive fallback, plus a gridless O(n^2)
//!   reference variant.
//! - **Stream Normalizer**: insert implicit power toggles, pair toggles with
//!   working-axis lifts, and collapse toggles with no observable effect.
//!
//! The whole pipeline is a synchronous, single-threaded batch transform.
//! Run it on a worker thread and use [`laserkit_core::CancelToken`] to stop
//! it cooperatively; the input list is never left half-rewritten.

pub mod error;
pub mod grid;
pub mod grouping;
pub mod normalize;
pub mod tour;

pub use error::{OptimizeError, OptimizeResult};
pub use grid::{CellKey, SpatialGrid, GRID_SIZE};
pub use grouping::{build_groups, CommandGroup, GroupBoundary};
pub use normalize::{NormalizerSettings, StreamNormalizer};
pub use tour::{PathOptimizer, TourStats, SCAN_RANGE};
