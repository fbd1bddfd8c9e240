//! Sparse, multi-threaded Conway's Game of Life.
//!
//! Live cells are kept in a hash set over an unbounded `i64` plane, so work
//! scales with population rather than area. Each tick the current
//! [`Generation`] is split into chunks, the chunks are evaluated in parallel
//! against the same read-only snapshot, and the partial results are merged
//! into the next generation:
//!
//! ```text
//! clock ─▶ TickScheduler ─▶ chunker::partition ─▶ WorkerPool ─▶ merge ─▶ watch (1 slot) ─▶ viewer
//!               ▲                                                                          │
//!               └────────────────────── Command::TogglePause ◀────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use conway_sparse::{SimConfig, TickScheduler, patterns};
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! let glider = patterns::find("glider").unwrap().generation();
//! let mut handle = TickScheduler::start(SimConfig::default(), glider, runtime.handle());
//!
//! handle.toggle_pause()?;
//! if let Some(snapshot) = handle.poll() {
//!     println!("generation {}: {} cells", snapshot.generation, snapshot.cells.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chunker;
pub mod config;
pub mod error;
pub mod grid;
pub mod merge;
pub mod patterns;
pub mod pool;
pub mod rule;
pub mod scheduler;

pub use chunker::Chunk;
pub use config::{OverloadPolicy, SimConfig};
pub use error::{ConfigError, SchedulerError};
pub use grid::{Cell, Generation};
pub use pool::WorkerPool;
pub use rule::PartialResult;
pub use scheduler::{Command, RunState, SchedulerHandle, Snapshot, TickScheduler};
