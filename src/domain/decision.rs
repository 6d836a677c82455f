//! Outcome of an admission check.
//!
//! Rejection is an ordinary value rather than an error: callers branch on
//! [`Decision`] and surface the [`Rejection`] message however their transport
//! requires.

use crate::domain::policy::{Tier, TierKind};
use std::fmt;
use std::time::Duration;

/// Details of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    /// Time until the oldest counted request leaves the violated window
    pub retry_after: Duration,
    /// Number of requests counted in the violated window
    pub current_count: usize,
    /// The first tier found at or over its limit
    pub violated_tier: Tier,
}

impl Rejection {
    /// Retry delay in whole seconds, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

impl fmt::Display for Rejection {
    /// User-facing message, e.g.
    /// `Rate limit exceeded: 2 requests in the last minute. Try again in 40 seconds.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = match self.violated_tier.kind() {
            TierKind::PerMinute => "minute".to_string(),
            TierKind::PerHour => "hour".to_string(),
            TierKind::SlidingWindow => format_secs(self.violated_tier.window().as_secs()),
        };
        write!(
            f,
            "Rate limit exceeded: {} {} in the last {}. Try again in {}.",
            self.current_count,
            if self.current_count == 1 {
                "request"
            } else {
                "requests"
            },
            period,
            format_secs(self.retry_after_secs())
        )
    }
}

/// Verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed and has been recorded
    Admitted,
    /// The request must not proceed
    Rejected(Rejection),
}

impl Decision {
    /// Check if this decision is `Admitted`.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }

    /// Check if this decision is `Rejected`.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Decision::Rejected(_))
    }

    /// The rejection details, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Admitted => None,
            Decision::Rejected(r) => Some(r),
        }
    }
}

/// Current standing of a subject against one enabled tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierUsage {
    /// The tier being reported
    pub tier: Tier,
    /// Requests counted in the tier's window
    pub count: usize,
    /// Admissions left before the tier rejects
    pub remaining: usize,
    /// Time until the oldest counted request leaves the window
    pub resets_in: Duration,
}

/// Render a number of seconds as `1 hour 2 minutes 3 seconds`.
///
/// Zero components are omitted; zero itself renders as `0 seconds`.
pub fn format_secs(total: u64) -> String {
    if total == 0 {
        return "0 seconds".to_string();
    }

    let parts = [
        (total / 3600, "hour"),
        ((total % 3600) / 60, "minute"),
        (total % 60, "second"),
    ];

    parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| {
            if *n == 1 {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", n, unit)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
