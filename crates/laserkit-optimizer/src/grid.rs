//! Spatial bucket index over group start points
//!
//! A uniform grid of 10x10-unit cells mapping integer cell keys to the
//! groups whose start point falls inside the cell. The tour builder scans a
//! small window of cells around its current position instead of every
//! remaining group.
//!
//! Groups live in a dense arena owned by the tour builder; the grid stores
//! arena indices only, so there is no shared ownership of group data and the
//! hash key is an integer pair rather than floating-point coordinates.

use laserkit_core::Point;
use std::collections::HashMap;

/// Cell edge length, in toolpath units.
pub const GRID_SIZE: f64 = 10.0;

/// Integer cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    /// Cell column: `floor(x / GRID_SIZE)`.
    pub x: i32,
    /// Cell row: `floor(y / GRID_SIZE)`.
    pub y: i32,
}

impl CellKey {
    /// The cell containing a point.
    pub fn containing(point: Point) -> Self {
        Self {
            x: (point.x / GRID_SIZE).floor() as i32,
            y: (point.y / GRID_SIZE).floor() as i32,
        }
    }
}

/// Bucketed index from cell key to the arena indices of the groups whose
/// start point falls in that cell.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<CellKey, Vec<usize>>,
    len: usize,
}

impl SpatialGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a group by its start point.
    pub fn insert(&mut self, index: usize, start: Point) {
        self.cells
            .entry(CellKey::containing(start))
            .or_default()
            .push(index);
        self.len += 1;
    }

    /// Remove a group, keyed by the same start point it was inserted under.
    ///
    /// A remove targeting an absent cell or an index not present in it is a
    /// no-op; such drift must not abort a run.
    pub fn remove(&mut self, index: usize, start: Point) {
        let key = CellKey::containing(start);
        if let Some(cell) = self.cells.get_mut(&key) {
            if let Some(slot) = cell.iter().position(|&i| i == index) {
                cell.remove(slot);
                self.len -= 1;
                if cell.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Group indices whose start point falls in cell `(x, y)`, in insertion
    /// order. Empty when the cell is unoccupied.
    pub fn cell(&self, x: i32, y: i32) -> &[usize] {
        self.cells
            .get(&CellKey { x, y })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of groups currently indexed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no groups remain.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_floors_toward_negative() {
        assert_eq!(CellKey::containing(Point::new(0.0, 0.0)), CellKey { x: 0, y: 0 });
        assert_eq!(CellKey::containing(Point::new(9.99, 10.0)), CellKey { x: 0, y: 1 });
        assert_eq!(CellKey::containing(Point::new(-0.1, -10.0)), CellKey { x: -1, y: -1 });
    }

    #[test]
    fn test_group_reachable_at_exactly_its_cell() {
        let mut grid = SpatialGrid::new();
        let start = Point::new(25.0, 14.0);
        grid.insert(7, start);

        assert_eq!(grid.cell(2, 1), &[7]);
        for x in -3..6 {
            for y in -3..6 {
                if (x, y) != (2, 1) {
                    assert!(grid.cell(x, y).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_remove_drops_empty_cell() {
        let mut grid = SpatialGrid::new();
        let a = Point::new(1.0, 1.0);
        let b = Point::new(2.0, 2.0);
        grid.insert(0, a);
        grid.insert(1, b);
        assert_eq!(grid.cell(0, 0), &[0, 1]);

        grid.remove(0, a);
        assert_eq!(grid.cell(0, 0), &[1]);
        assert_eq!(grid.len(), 1);

        grid.remove(1, b);
        assert!(grid.is_empty());
        assert!(grid.cell(0, 0).is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut grid = SpatialGrid::new();
        grid.insert(0, Point::new(1.0, 1.0));

        grid.remove(5, Point::new(1.0, 1.0));
        grid.remove(0, Point::new(99.0, 99.0));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.cell(0, 0), &[0]);
    }
}
