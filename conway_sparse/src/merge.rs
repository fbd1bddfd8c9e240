// merge.rs - Unions worker results into the next generation

use crate::grid::Generation;
use crate::rule::PartialResult;

/// Combines every worker's partial result into one generation.
///
/// Two workers can only agree on a shared coordinate (a birth next to cells
/// from both chunks), so repeated inserts are no-ops.
pub fn merge<I>(partials: I) -> Generation
where
    I: IntoIterator<Item = PartialResult>,
{
    let partials: Vec<PartialResult> = partials.into_iter().collect();
    let capacity = partials.iter().map(PartialResult::len).sum();

    let mut next = Generation::with_capacity(capacity);
    for partial in partials {
        for cell in partial {
            next.insert(cell);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn shared_birth_is_kept_once() {
        let left: PartialResult = [Cell::new(1, 1), Cell::new(0, 0)].into_iter().collect();
        let right: PartialResult = [Cell::new(1, 1), Cell::new(2, 0)].into_iter().collect();

        let merged = merge([left, right]);

        assert_eq!(merged.len(), 3);
        assert!(merged.contains(1, 1));
    }

    #[test]
    fn no_partials_merge_to_empty() {
        assert!(merge(Vec::new()).is_empty());
    }
}
