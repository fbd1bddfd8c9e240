// chunker.rs - Splits a generation's live cells into per-worker chunks

use std::num::NonZeroUsize;

use crate::grid::{Cell, Generation};

/// The live cells one worker evaluates for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    cells: Vec<Cell>,
}

impl Chunk {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Partitions the live cells of `generation` into chunks.
///
/// Fewer live cells than workers yields a single chunk holding all of them
/// (a single empty chunk for an empty generation). Otherwise exactly
/// `workers` chunks are produced whose sizes differ by at most one, so none
/// exceeds `ceil(len / workers)`. Every live cell lands in exactly one chunk.
pub fn partition(generation: &Generation, workers: NonZeroUsize) -> Vec<Chunk> {
    let total = generation.len();
    let workers = workers.get();

    if total < workers {
        return vec![Chunk { cells: generation.iter().copied().collect() }];
    }

    let base = total / workers;
    let remainder = total % workers;
    let mut cells = generation.iter().copied();

    (0..workers)
        .map(|index| {
            // The first `remainder` chunks take one extra cell
            let size = base + usize::from(index < remainder);
            Chunk { cells: cells.by_ref().take(size).collect() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn line(len: i64) -> Generation {
        (0..len).map(|x| (x, x % 7)).collect()
    }

    #[test]
    fn small_generation_stays_in_one_chunk() {
        let chunks = partition(&line(3), workers(4));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }

    #[test]
    fn empty_generation_yields_one_empty_chunk() {
        let chunks = partition(&Generation::new(), workers(4));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }

    #[test]
    fn chunk_sizes_are_balanced() {
        let chunks = partition(&line(10), workers(4));
        let sizes: Vec<usize> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn exactly_one_chunk_per_worker_when_cells_equal_workers() {
        let chunks = partition(&line(4), workers(4));
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        for n in [0, 1, 3, 4, 5, 17, 100, 1001] {
            let generation = line(n);
            for w in 1..=9 {
                let chunks = partition(&generation, workers(w));
                let limit = if generation.len() < w {
                    generation.len()
                } else {
                    generation.len().div_ceil(w)
                };
                assert!(chunks.iter().all(|c| c.len() <= limit));

                let mut seen = HashSet::new();
                for cell in chunks.iter().flat_map(|c| c.cells()) {
                    assert!(seen.insert(*cell), "{cell:?} assigned twice (n={n}, w={w})");
                }
                let expected: HashSet<Cell> = generation.iter().copied().collect();
                assert_eq!(seen, expected, "n={n}, w={w}");
            }
        }
    }
}
