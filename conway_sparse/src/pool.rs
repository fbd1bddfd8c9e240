// pool.rs - Fans chunks out to parallel workers and collects their results

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::chunker;
use crate::error::SchedulerError;
use crate::grid::{Cell, Generation};
use crate::merge;
use crate::rule::{self, PartialResult};

/// Body run by each worker: snapshot plus chunk in, partial result out.
pub type Evaluator = Arc<dyn Fn(&Generation, &[Cell]) -> PartialResult + Send + Sync>;

/// Runs one evaluation task per chunk against a shared, read-only snapshot.
#[derive(Clone)]
pub struct WorkerPool {
    workers: NonZeroUsize,
    evaluator: Evaluator,
}

impl WorkerPool {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self::with_evaluator(workers, Arc::new(rule::evaluate_chunk))
    }

    /// Pool whose workers run `evaluator` instead of the standard rule.
    pub fn with_evaluator(workers: NonZeroUsize, evaluator: Evaluator) -> Self {
        Self { workers, evaluator }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Starts one blocking task per chunk of `current` and returns without waiting.
    ///
    /// Every chunk, including the only one of a small generation, runs off the
    /// async workers so a caller's deadline can always fire. Must be called
    /// from within a tokio runtime.
    pub fn dispatch(&self, current: &Arc<Generation>) -> Evaluation {
        let chunks = chunker::partition(current, self.workers);
        let expected = chunks.len();

        let mut tasks = JoinSet::new();
        for chunk in chunks {
            let snapshot = Arc::clone(current);
            let evaluator = Arc::clone(&self.evaluator);
            tasks.spawn_blocking(move || evaluator(&snapshot, chunk.cells()));
        }

        Evaluation {
            tasks,
            partials: Vec::with_capacity(expected),
            expected,
        }
    }

    /// Evaluates every chunk of `current`, returning one partial result per chunk.
    pub async fn evaluate(&self, current: &Arc<Generation>) -> Result<Vec<PartialResult>, SchedulerError> {
        let mut evaluation = self.dispatch(current);
        evaluation.wait().await?;
        Ok(evaluation.into_partials())
    }

    /// Full pipeline for one tick: partition, evaluate, merge.
    pub async fn next_generation(&self, current: &Arc<Generation>) -> Result<Generation, SchedulerError> {
        let partials = self.evaluate(current).await?;
        Ok(merge::merge(partials))
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// One tick's fan-out: the running worker tasks and the results collected so far.
///
/// Dropping it aborts workers that have not started; ones already running
/// finish and their results are discarded.
pub struct Evaluation {
    tasks: JoinSet<PartialResult>,
    partials: Vec<PartialResult>,
    expected: usize,
}

impl Evaluation {
    /// Waits until every worker has reported.
    ///
    /// Cancel-safe: results gathered before the future is dropped are kept,
    /// so a timed-out wait can be resumed later.
    pub async fn wait(&mut self) -> Result<(), SchedulerError> {
        while let Some(joined) = self.tasks.join_next().await {
            let partial = joined.map_err(|err| SchedulerError::WorkerFailed(err.to_string()))?;
            self.partials.push(partial);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.partials.len() == self.expected
    }

    /// Number of chunks dispatched.
    pub fn chunks(&self) -> usize {
        self.expected
    }

    pub fn into_partials(self) -> Vec<PartialResult> {
        debug_assert!(self.is_complete());
        self.partials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pool(workers: usize) -> WorkerPool {
        WorkerPool::new(NonZeroUsize::new(workers).unwrap())
    }

    fn generation(cells: &[(i64, i64)]) -> Arc<Generation> {
        Arc::new(cells.iter().copied().collect())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn block_is_a_still_life() {
        let block = generation(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        for workers in [1, 4] {
            let next = pool(workers).next_generation(&block).await.unwrap();
            assert_eq!(&next, block.as_ref());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn blinker_has_period_two() {
        let horizontal = generation(&[(0, 0), (1, 0), (2, 0)]);
        let vertical = generation(&[(1, -1), (1, 0), (1, 1)]);

        for workers in [1, 2, 4] {
            let pool = pool(workers);
            let first = Arc::new(pool.next_generation(&horizontal).await.unwrap());
            assert_eq!(first, vertical);
            let second = pool.next_generation(&first).await.unwrap();
            assert_eq!(&second, horizontal.as_ref());
        }
    }

    #[tokio::test]
    async fn empty_stays_empty() {
        let empty = Arc::new(Generation::new());
        assert!(pool(4).next_generation(&empty).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn result_does_not_depend_on_worker_count() {
        let mut single = Arc::new(patterns::soup(7, 40, 40));
        let mut parallel = Arc::clone(&single);
        assert!(single.len() > 100);

        for _ in 0..20 {
            single = Arc::new(pool(1).next_generation(&single).await.unwrap());
            parallel = Arc::new(pool(4).next_generation(&parallel).await.unwrap());
            assert_eq!(single, parallel);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn glider_gun_matches_across_worker_counts() {
        let gun = patterns::find("gosper-glider-gun").unwrap().generation();
        let mut a = Arc::new(gun.clone());
        let mut b = Arc::new(gun);
        for _ in 0..60 {
            a = Arc::new(pool(3).next_generation(&a).await.unwrap());
            b = Arc::new(pool(8).next_generation(&b).await.unwrap());
        }
        assert_eq!(a, b);
        // One glider emitted per 30 generations on top of the 36-cell gun
        assert!(a.len() > 36);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn waits_for_one_result_per_chunk() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let evaluator: Evaluator = Arc::new(move |generation: &Generation, chunk: &[Cell]| {
            counter.fetch_add(1, Ordering::SeqCst);
            rule::evaluate_chunk(generation, chunk)
        });
        let pool = WorkerPool::with_evaluator(NonZeroUsize::new(4).unwrap(), evaluator);

        let partials = pool.evaluate(&Arc::new(patterns::soup(3, 20, 20))).await.unwrap();
        assert_eq!(partials.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let partials = pool.evaluate(&generation(&[(0, 0), (1, 0)])).await.unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn single_chunk_runs_off_the_async_worker() {
        let evaluator: Evaluator = Arc::new(|generation: &Generation, chunk: &[Cell]| {
            std::thread::sleep(std::time::Duration::from_millis(200));
            rule::evaluate_chunk(generation, chunk)
        });
        let pool = WorkerPool::with_evaluator(NonZeroUsize::new(1).unwrap(), evaluator);

        let mut evaluation = pool.dispatch(&generation(&[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(evaluation.chunks(), 1);

        // The wait must be interruptible, then resumable with nothing lost
        let waited = tokio::time::timeout(std::time::Duration::from_millis(20), evaluation.wait()).await;
        assert!(waited.is_err());
        assert!(!evaluation.is_complete());

        evaluation.wait().await.unwrap();
        let next = merge::merge(evaluation.into_partials());
        assert_eq!(next, *generation(&[(1, -1), (1, 0), (1, 1)]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn worker_panic_is_reported() {
        let evaluator: Evaluator = Arc::new(|_: &Generation, chunk: &[Cell]| {
            if chunk.iter().any(|c| c.x() == 0 && c.y() == 0) {
                panic!("boom");
            }
            PartialResult::default()
        });
        let pool = WorkerPool::with_evaluator(NonZeroUsize::new(2).unwrap(), evaluator);

        let err = pool.evaluate(&generation(&[(0, 0), (5, 5), (9, 9), (20, 20)])).await.unwrap_err();
        assert!(matches!(err, SchedulerError::WorkerFailed(_)));
    }
}
