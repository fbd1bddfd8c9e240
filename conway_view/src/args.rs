//! Command line arguments for the viewer.

use std::path::PathBuf;

use clap::Parser;
use conway_sparse::config::DEFAULT_TICK_INTERVAL_MS;
use conway_sparse::{ConfigError, OverloadPolicy, SimConfig};

/// Sparse Game of Life viewer.
///
/// Starting cells come from `--input` (or stdin), a built-in pattern, or a
/// random soup. The simulation starts paused; press Enter to run.
///
/// ```bash
/// # Coordinate pairs on stdin
/// printf '0 0\n1 0\n2 0\n' | conway_view
///
/// # Plaintext pattern from a file, 8 workers, running immediately
/// conway_view --pattern -i gun.cells -w 8 --run
/// ```
#[derive(Parser, Debug)]
#[command(name = "conway_view", version)]
pub struct Args {
    /// Input is a plaintext pattern (`!` comments, `O` for live cells)
    /// rather than one `x y` pair per line
    #[arg(short = 'p', long)]
    pub pattern: bool,

    /// File to read the starting cells from; stdin when omitted
    #[arg(short = 'i', long, conflicts_with_all = ["builtin", "random"])]
    pub input: Option<PathBuf>,

    /// Start from a built-in pattern (glider, blinker, toad, beacon, pulsar,
    /// r-pentomino, gosper-glider-gun)
    #[arg(short = 'b', long, conflicts_with = "random")]
    pub builtin: Option<String>,

    /// Start from a random soup generated from this seed
    #[arg(long, value_name = "SEED")]
    pub random: Option<u64>,

    /// Side length of the random soup
    #[arg(long, default_value_t = 64)]
    pub random_size: i64,

    /// Milliseconds between ticks, also the deadline for one tick's workers
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Number of parallel workers per tick
    #[arg(short = 'w', long, default_value_t = 4)]
    pub workers: usize,

    /// What to do when a tick misses its deadline: abort, skip or tolerate
    #[arg(long, default_value_t = OverloadPolicy::Tolerate)]
    pub on_overload: OverloadPolicy,

    /// Start running instead of paused
    #[arg(long)]
    pub run: bool,
}

impl Args {
    pub fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        Ok(SimConfig::new(self.interval_ms, self.workers)?.with_overload(self.on_overload))
    }
}
