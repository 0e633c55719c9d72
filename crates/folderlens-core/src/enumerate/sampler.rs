/// Time-based flush throttle for intermediate batches.

use std::time::{Duration, Instant};

/// Default minimum interval between time-triggered flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Rate limiter deciding when enough time has passed to flush a partial
/// batch. The count threshold in the batcher fires independently, so the
/// effective cadence is whichever trigger comes first.
#[derive(Debug)]
pub struct BatchSampler {
    min_interval: Duration,
    last_flush: Instant,
}

impl BatchSampler {
    /// The clock starts at construction: the first time-based flush becomes
    /// due one full interval into the scan.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_flush: Instant::now(),
        }
    }

    pub fn should_flush(&self) -> bool {
        self.last_flush.elapsed() >= self.min_interval
    }

    pub fn mark_flushed(&mut self) {
        self.last_flush = Instant::now();
    }
}

impl Default for BatchSampler {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}
