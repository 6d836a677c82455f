//! Admission counters.
//!
//! A request ends in one of three ways: evaluated and admitted, evaluated and
//! rejected by some tier, or let through unevaluated as an exempt admin.
//! Rejections are counted per tier so hosts can see which quota binds.
//! Bypasses are reported next to the other two but are not part of the
//! rejection rate.

use crate::domain::policy::TierKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const TIER_KINDS: [TierKind; 3] = [
    TierKind::PerMinute,
    TierKind::PerHour,
    TierKind::SlidingWindow,
];

fn slot(kind: TierKind) -> usize {
    match kind {
        TierKind::PerMinute => 0,
        TierKind::PerHour => 1,
        TierKind::SlidingWindow => 2,
    }
}

/// Shared admission counters.
///
/// Clones observe and update the same counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    admitted: AtomicU64,
    bypassed: AtomicU64,
    rejected: [AtomicU64; 3],
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_admitted(&self) {
        self.counters.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self, tier: TierKind) {
        self.counters.rejected[slot(tier)].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admin_bypass(&self) {
        self.counters.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests admitted after evaluation.
    pub fn requests_admitted(&self) -> u64 {
        self.counters.admitted.load(Ordering::Relaxed)
    }

    /// Requests rejected by any tier.
    pub fn requests_rejected(&self) -> u64 {
        self.counters
            .rejected
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .fold(0, u64::saturating_add)
    }

    /// Requests rejected with `tier` as the violated tier.
    pub fn rejections_for(&self, tier: TierKind) -> u64 {
        self.counters.rejected[slot(tier)].load(Ordering::Relaxed)
    }

    /// Admin requests admitted without evaluation.
    pub fn admin_bypasses(&self) -> u64 {
        self.counters.bypassed.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter.
    ///
    /// Counters are read one by one, so a snapshot taken under load may mix
    /// values from slightly different instants.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let rejected_by_tier = TierRejections {
            per_minute: self.rejections_for(TierKind::PerMinute),
            per_hour: self.rejections_for(TierKind::PerHour),
            sliding_window: self.rejections_for(TierKind::SlidingWindow),
        };
        MetricsSnapshot {
            requests_admitted: self.requests_admitted(),
            requests_rejected: rejected_by_tier.total(),
            admin_bypasses: self.admin_bypasses(),
            rejected_by_tier,
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.counters.admitted.store(0, Ordering::Relaxed);
        self.counters.bypassed.store(0, Ordering::Relaxed);
        for counter in &self.counters.rejected {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Rejections split by the tier that fired first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierRejections {
    pub per_minute: u64,
    pub per_hour: u64,
    pub sliding_window: u64,
}

impl TierRejections {
    /// Count for one tier.
    pub fn get(&self, tier: TierKind) -> u64 {
        match tier {
            TierKind::PerMinute => self.per_minute,
            TierKind::PerHour => self.per_hour,
            TierKind::SlidingWindow => self.sliding_window,
        }
    }

    /// Sum over all tiers.
    pub fn total(&self) -> u64 {
        TIER_KINDS
            .iter()
            .map(|&kind| self.get(kind))
            .fold(0, u64::saturating_add)
    }
}

/// A point-in-time copy of the admission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests admitted after evaluation
    pub requests_admitted: u64,
    /// Requests rejected by any tier, the sum of `rejected_by_tier`
    pub requests_rejected: u64,
    /// Admin requests admitted without evaluation
    pub admin_bypasses: u64,
    /// Rejections per violated tier
    pub rejected_by_tier: TierRejections,
}

impl MetricsSnapshot {
    /// Requests that went through tier evaluation.
    pub fn evaluated(&self) -> u64 {
        self.requests_admitted.saturating_add(self.requests_rejected)
    }

    /// Every request seen, bypasses included.
    pub fn total(&self) -> u64 {
        self.evaluated().saturating_add(self.admin_bypasses)
    }

    /// Share of evaluated requests that were rejected (0.0 to 1.0).
    ///
    /// Admin bypasses are not evaluated and do not count. Returns 0.0 when
    /// nothing has been evaluated.
    pub fn rejection_rate(&self) -> f64 {
        match self.evaluated() {
            0 => 0.0,
            evaluated => self.requests_rejected as f64 / evaluated as f64,
        }
    }

    /// Share of all requests that bypassed evaluation (0.0 to 1.0).
    pub fn bypass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.admin_bypasses as f64 / total as f64,
        }
    }

    /// The tier behind the most rejections, if any request was rejected.
    ///
    /// Ties go to the shorter tier (per-minute, per-hour, sliding window).
    pub fn binding_tier(&self) -> Option<TierKind> {
        TIER_KINDS
            .iter()
            .copied()
            .filter(|&kind| self.rejected_by_tier.get(kind) > 0)
            .fold(None, |best: Option<TierKind>, kind| match best {
                Some(b) if self.rejected_by_tier.get(b) >= self.rejected_by_tier.get(kind) => {
                    Some(b)
                }
                _ => Some(kind),
            })
    }
}
