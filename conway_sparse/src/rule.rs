// rule.rs - Conway's B3/S23 rule and the per-chunk worker body

use std::collections::HashSet;
use std::collections::hash_set;

use crate::grid::{Cell, Generation};

/// Next state of one cell given its live-neighbor count.
pub fn next_state(alive: bool, count: u8) -> bool {
    match (alive, count) {
        (true, 2) | (true, 3) => true,   // Survival
        (false, 3)            => true,   // Birth
        _                     => false,  // Death or stays dead
    }
}

pub fn survive(count: u8) -> bool {
    next_state(true, count)
}

pub fn birth(count: u8) -> bool {
    next_state(false, count)
}

/// Cells one worker found live in the next generation.
///
/// Owned by the worker that built it until handed to the merger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResult {
    cells: HashSet<Cell>,
}

impl PartialResult {
    pub fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl IntoIterator for PartialResult {
    type Item = Cell;
    type IntoIter = hash_set::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl FromIterator<Cell> for PartialResult {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

/// Evaluates one chunk of live cells against the shared snapshot.
///
/// Survivors from `chunk` are kept, and every dead neighbor of a chunk cell
/// that satisfies the birth rule is added. Reads `generation` only.
pub fn evaluate_chunk(generation: &Generation, chunk: &[Cell]) -> PartialResult {
    let mut result = PartialResult::default();

    for &cell in chunk {
        if survive(generation.live_neighbors(cell)) {
            result.insert(cell);
        }

        for neighbor in cell.neighbors() {
            // Already decided by this worker, or live and handled by its own chunk
            if generation.contains_cell(neighbor) || result.contains(neighbor) {
                continue;
            }
            if birth(generation.live_neighbors(neighbor)) {
                result.insert(neighbor);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_needs_two_or_three() {
        let survivors: Vec<u8> = (0..=8).filter(|&n| survive(n)).collect();
        assert_eq!(survivors, vec![2, 3]);
    }

    #[test]
    fn birth_needs_exactly_three() {
        let births: Vec<u8> = (0..=8).filter(|&n| birth(n)).collect();
        assert_eq!(births, vec![3]);
    }

    #[test]
    fn lone_cell_dies_without_births() {
        let generation: Generation = [(0, 0)].into_iter().collect();
        let chunk: Vec<Cell> = generation.iter().copied().collect();
        assert!(evaluate_chunk(&generation, &chunk).is_empty());
    }

    #[test]
    fn chunk_reports_births_around_its_cells() {
        // Blinker, but only the middle cell is in this chunk
        let generation: Generation = [(0, 0), (1, 0), (2, 0)].into_iter().collect();
        let result = evaluate_chunk(&generation, &[Cell::new(1, 0)]);

        let expected: PartialResult = [Cell::new(1, 0), Cell::new(1, 1), Cell::new(1, -1)]
            .into_iter()
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn end_cell_of_blinker_only_proposes_births() {
        let generation: Generation = [(0, 0), (1, 0), (2, 0)].into_iter().collect();
        let result = evaluate_chunk(&generation, &[Cell::new(0, 0)]);

        assert!(!result.contains(Cell::new(0, 0)));
        assert!(result.contains(Cell::new(1, 1)));
        assert!(result.contains(Cell::new(1, -1)));
        assert_eq!(result.len(), 2);
    }
}
