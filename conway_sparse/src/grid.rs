// grid.rs - Sparse grid types for Conway's Game of Life

use std::collections::HashSet;
use std::collections::hash_set;

/// Moore neighborhood offsets, center excluded.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1),   (1, -1), (1, 0),  (1, 1),
];

/// A coordinate on the unbounded plane. Up is positive `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    x: i64,
    y: i64,
}

impl Cell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub const fn x(self) -> i64 {
        self.x
    }

    pub const fn y(self) -> i64 {
        self.y
    }

    /// The 8 Moore neighbors. Coordinates wrap at the `i64` limits.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| Cell::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy)))
    }
}

impl From<(i64, i64)> for Cell {
    fn from((x, y): (i64, i64)) -> Self {
        Cell::new(x, y)
    }
}

/// Every live cell of one simulation step.
///
/// A `Generation` has no public mutators: each tick builds a fresh one, and
/// published generations are shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    cells: HashSet<Cell>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { cells: HashSet::with_capacity(capacity) }
    }

    /// Inserts a cell, returning `false` if it was already present.
    pub(crate) fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.cells.contains(&Cell::new(x, y))
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Live cells among the 8 neighbors of `(x, y)`, whether or not `(x, y)`
    /// itself is live. Always in `0..=8`.
    pub fn neighbor_count(&self, x: i64, y: i64) -> u8 {
        self.live_neighbors(Cell::new(x, y))
    }

    pub fn live_neighbors(&self, cell: Cell) -> u8 {
        cell.neighbors().filter(|n| self.cells.contains(n)).count() as u8
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Live cells in `(x, y)` order, for stable output.
    pub fn sorted(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }
}

impl FromIterator<Cell> for Generation {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

impl FromIterator<(i64, i64)> for Generation {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        iter.into_iter().map(Cell::from).collect()
    }
}

impl<'a> IntoIterator for &'a Generation {
    type Item = &'a Cell;
    type IntoIter = hash_set::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
