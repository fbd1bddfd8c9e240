// scheduler.rs - Periodic tick loop, pause state and the render handoff channel

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{OverloadPolicy, SimConfig};
use crate::error::SchedulerError;
use crate::grid::Generation;
use crate::merge;
use crate::pool::{Evaluation, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
}

impl RunState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Paused  => Self::Running,
            Self::Running => Self::Paused,
        }
    }
}

/// Requests accepted by the tick loop, applied at the next tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
}

/// A published generation together with its tick number (0 = initial input).
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub cells: Arc<Generation>,
}

/// An evaluation that outlived its tick under [`OverloadPolicy::Skip`].
struct InFlight {
    started: Instant,
    evaluation: Evaluation,
}

/// Owns the current generation and advances it on every running tick.
pub struct TickScheduler {
    config: SimConfig,
    pool: WorkerPool,
    current: Arc<Generation>,
    generation: u64,
    state: RunState,
    commands: mpsc::UnboundedReceiver<Command>,
    publisher: watch::Sender<Snapshot>,
    in_flight: Option<InFlight>,
}

impl TickScheduler {
    /// Builds a paused scheduler seeded with `initial`, plus the sender for
    /// its commands and a receiver already holding the initial snapshot.
    pub fn new(
        config: SimConfig,
        initial: Generation,
    ) -> (Self, mpsc::UnboundedSender<Command>, watch::Receiver<Snapshot>) {
        let pool = WorkerPool::new(config.workers);
        Self::with_pool(config, pool, initial)
    }

    pub fn with_pool(
        config: SimConfig,
        pool: WorkerPool,
        initial: Generation,
    ) -> (Self, mpsc::UnboundedSender<Command>, watch::Receiver<Snapshot>) {
        let current = Arc::new(initial);
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (publisher, mut snapshots) = watch::channel(Snapshot {
            generation: 0,
            cells: Arc::clone(&current),
        });
        // The seed is already on screen; only computed generations count as new
        snapshots.mark_unchanged();

        let scheduler = Self {
            config,
            pool,
            current,
            generation: 0,
            state: RunState::Paused,
            commands,
            publisher,
            in_flight: None,
        };
        (scheduler, command_tx, snapshots)
    }

    /// Spawns the tick loop on `runtime` and returns a handle to it.
    pub fn start(config: SimConfig, initial: Generation, runtime: &Handle) -> SchedulerHandle {
        let (scheduler, commands, snapshots) = Self::new(config, initial);
        let task = runtime.spawn(scheduler.run());
        SchedulerHandle { commands, snapshots, task }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current(&self) -> &Arc<Generation> {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs forever on a fixed clock.
    ///
    /// Only returns on a worker failure, or on an overrun under
    /// [`OverloadPolicy::Abort`].
    pub async fn run(mut self) -> Result<(), SchedulerError> {
        let period = self.config.tick_interval;
        let mut clock = time::interval_at(Instant::now() + period, period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Tick loop started: {:?} interval, {} workers, {} on overload",
            period, self.config.workers, self.config.overload
        );

        loop {
            clock.tick().await;
            if let Err(err) = self.tick().await {
                error!("Tick loop stopped: {err}");
                return Err(err);
            }
        }
    }

    /// One clock fire: apply pending commands, then advance if running.
    ///
    /// Returns the published snapshot, or `None` when paused or when the
    /// workers are still busy and the tick was skipped.
    pub async fn tick(&mut self) -> Result<Option<Snapshot>, SchedulerError> {
        self.drain_commands();

        if self.state == RunState::Paused {
            return Ok(None);
        }

        let Some(next) = self.advance().await? else {
            return Ok(None);
        };

        self.current = Arc::new(next);
        self.generation += 1;

        let snapshot = Snapshot {
            generation: self.generation,
            cells: Arc::clone(&self.current),
        };
        // Overwrites an unread snapshot; never waits on the consumer
        self.publisher.send_replace(snapshot.clone());
        Ok(Some(snapshot))
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::TogglePause => {
                    self.state = self.state.toggled();
                    info!("Simulation {:?} at generation {}", self.state, self.generation);
                }
            }
        }
    }

    /// Computes the next generation under the tick deadline.
    ///
    /// A skipped evaluation is resumed on the following ticks rather than
    /// started again, so at most one tick's workers are ever busy.
    async fn advance(&mut self) -> Result<Option<Generation>, SchedulerError> {
        let tick = self.generation + 1;
        let budget = self.config.tick_interval;

        let mut in_flight = match self.in_flight.take() {
            Some(in_flight) => in_flight,
            None => InFlight {
                started: Instant::now(),
                evaluation: self.pool.dispatch(&self.current),
            },
        };

        let outcome = time::timeout(budget, in_flight.evaluation.wait()).await;
        match outcome {
            Ok(result) => result?,
            Err(_) => match self.config.overload {
                OverloadPolicy::Abort => {
                    let elapsed = in_flight.started.elapsed();
                    return Err(SchedulerError::Overload { tick, elapsed, budget });
                }
                OverloadPolicy::Skip => {
                    warn!("Tick {tick} exceeded {budget:?}; skipping until workers finish");
                    self.in_flight = Some(in_flight);
                    return Ok(None);
                }
                OverloadPolicy::Tolerate => {
                    warn!("Tick {tick} exceeded {budget:?}; waiting for workers");
                    in_flight.evaluation.wait().await?;
                }
            },
        }

        let chunks = in_flight.evaluation.chunks();
        let next = merge::merge(in_flight.evaluation.into_partials());
        debug!(
            "Tick {tick}: {} -> {} cells in {} chunks, {:?}",
            self.current.len(),
            next.len(),
            chunks,
            in_flight.started.elapsed()
        );
        Ok(Some(next))
    }
}

/// Control surface of a running tick loop.
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<Result<(), SchedulerError>>,
}

impl SchedulerHandle {
    pub fn toggle_pause(&self) -> Result<(), SchedulerError> {
        self.commands
            .send(Command::TogglePause)
            .map_err(|_| SchedulerError::Stopped)
    }

    /// Takes the newest unseen snapshot without blocking.
    pub fn poll(&mut self) -> Option<Snapshot> {
        match self.snapshots.has_changed() {
            Ok(true) => Some(self.snapshots.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// The most recently published snapshot, seen or not.
    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Another receiver on the handoff channel.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tears the tick loop down. An in-flight tick is abandoned.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    /// Waits for the tick loop to end and reports why it did.
    pub async fn join(self) -> Result<(), SchedulerError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(SchedulerError::WorkerFailed(err.to_string())),
            Err(_) => Err(SchedulerError::Stopped),
        }
    }
}
