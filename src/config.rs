use std::time::Duration;

use crate::error::{Result, SimError};

const DEFAULT_WORKERS: usize = 2;
const DEFAULT_TICK_MS: u64 = 10;

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of simulated CPU cores, one worker thread each.
    pub workers: usize,
    /// Wall-clock length of one logical time unit.
    ///
    /// Only paces the run; dispatch decisions depend on logical ticks alone.
    /// A zero tick runs the whole simulation without sleeping.
    pub tick: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

impl SimConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SimError::NoWorkers);
        }
        Ok(())
    }
}
