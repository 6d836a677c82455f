//! Per-subject admission history.
//!
//! A history is a FIFO of admission timestamps bounded by time rather than
//! length. Entries are kept in ascending order and pruned lazily whenever the
//! subject is touched.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Count and oldest entry of the history that falls inside one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Entries younger than the window
    pub count: usize,
    /// Oldest of those entries
    pub earliest: Option<Instant>,
}

impl WindowStats {
    /// Stats of an empty window.
    pub fn empty() -> Self {
        Self {
            count: 0,
            earliest: None,
        }
    }

    /// Combine stats of two histories observed over the same window.
    pub fn merge(self, other: WindowStats) -> WindowStats {
        let earliest = match (self.earliest, other.earliest) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        WindowStats {
            count: self.count + other.count,
            earliest,
        }
    }

    /// Time until the oldest entry leaves a window of length `window`.
    ///
    /// Saturates at zero. Entries stamped after `now` count as age zero, so
    /// the full window is returned for them.
    pub fn retry_after(&self, window: Duration, now: Instant) -> Duration {
        match self.earliest {
            Some(earliest) => window.saturating_sub(now.saturating_duration_since(earliest)),
            None => Duration::ZERO,
        }
    }
}

/// Ordered admission timestamps of one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHistory {
    timestamps: VecDeque<Instant>,
}

impl RequestHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            timestamps: VecDeque::new(),
        }
    }

    /// Record an admission.
    ///
    /// Out-of-order timestamps are inserted in place so the sequence stays
    /// ascending.
    pub fn record(&mut self, timestamp: Instant) {
        match self.timestamps.back() {
            Some(&last) if timestamp < last => {
                let idx = self.timestamps.partition_point(|&t| t <= timestamp);
                self.timestamps.insert(idx, timestamp);
            }
            _ => self.timestamps.push_back(timestamp),
        }
    }

    /// Drop entries whose age at `now` is `max_window` or more.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: Instant, max_window: Duration) -> usize {
        let mut removed = 0;
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= max_window {
                self.timestamps.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// Entries whose age at `now` is strictly less than `window`.
    pub fn window_stats(&self, now: Instant, window: Duration) -> WindowStats {
        let start = self
            .timestamps
            .partition_point(|&t| now.saturating_duration_since(t) >= window);
        WindowStats {
            count: self.timestamps.len() - start,
            earliest: self.timestamps.get(start).copied(),
        }
    }

    /// Number of recorded admissions.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no admissions are recorded.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Oldest recorded admission.
    pub fn oldest(&self) -> Option<Instant> {
        self.timestamps.front().copied()
    }

    /// Iterate over timestamps, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.timestamps.iter()
    }
}
