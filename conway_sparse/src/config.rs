// config.rs - Simulation settings

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

pub const DEFAULT_WORKERS: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(n) => n,
    None => panic!("worker count must be non-zero"),
};

/// What the scheduler does when workers miss the tick deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverloadPolicy {
    /// Stop the scheduler with [`SchedulerError::Overload`](crate::SchedulerError::Overload).
    Abort,
    /// Keep the current generation and let the late workers finish over
    /// the following ticks; nothing new is dispatched meanwhile.
    Skip,
    /// Wait for the late workers and publish as usual.
    #[default]
    Tolerate,
}

impl FromStr for OverloadPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort"    => Ok(Self::Abort),
            "skip"     => Ok(Self::Skip),
            "tolerate" => Ok(Self::Tolerate),
            other      => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for OverloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Abort    => "abort",
            Self::Skip     => "skip",
            Self::Tolerate => "tolerate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Period of the tick clock, also the deadline for one tick's workers.
    pub tick_interval: Duration,
    pub workers: NonZeroUsize,
    pub overload: OverloadPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            workers: DEFAULT_WORKERS,
            overload: OverloadPolicy::default(),
        }
    }
}

impl SimConfig {
    pub fn new(interval_ms: u64, workers: usize) -> Result<Self, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let workers = NonZeroUsize::new(workers).ok_or(ConfigError::ZeroWorkers)?;

        Ok(Self {
            tick_interval: Duration::from_millis(interval_ms),
            workers,
            ..Self::default()
        })
    }

    /// Replaces the tick period. A zero period is rejected.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        self.tick_interval = tick_interval;
        Ok(self)
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_overload(mut self, overload: OverloadPolicy) -> Self {
        self.overload = overload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.workers.get(), 4);
        assert_eq!(config.overload, OverloadPolicy::Tolerate);
    }

    #[test]
    fn rejects_zero_values() {
        assert_eq!(SimConfig::new(0, 4), Err(ConfigError::ZeroInterval));
        assert_eq!(SimConfig::new(50, 0), Err(ConfigError::ZeroWorkers));
    }

    #[test]
    fn setters_replace_one_field_each() {
        let workers = NonZeroUsize::new(8).unwrap();
        let config = SimConfig::default()
            .with_workers(workers)
            .with_overload(OverloadPolicy::Skip)
            .with_tick_interval(Duration::from_millis(20))
            .unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(20));
        assert_eq!(config.workers, workers);
        assert_eq!(config.overload, OverloadPolicy::Skip);
        assert_eq!(
            SimConfig::default().with_tick_interval(Duration::ZERO),
            Err(ConfigError::ZeroInterval)
        );
    }

    #[test]
    fn policy_names_round_trip() {
        for policy in [OverloadPolicy::Abort, OverloadPolicy::Skip, OverloadPolicy::Tolerate] {
            assert_eq!(policy.to_string().parse::<OverloadPolicy>(), Ok(policy));
        }
        assert_eq!("SKIP".parse::<OverloadPolicy>(), Ok(OverloadPolicy::Skip));
        assert!(matches!(
            "backoff".parse::<OverloadPolicy>(),
            Err(ConfigError::UnknownPolicy(name)) if name == "backoff"
        ));
    }
}
