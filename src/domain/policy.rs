//! Quota policies for request admission.
//!
//! A [`Policy`] is an immutable snapshot of the quota tiers in force plus the
//! two switches that shape how they apply (global scope and admin exemption).
//! Reconfiguration replaces the whole value; nothing here mutates after
//! construction.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

/// Window length of the per-minute tier.
pub const MINUTE: Duration = Duration::from_secs(60);

/// Window length of the per-hour tier.
pub const HOUR: Duration = Duration::from_secs(3600);

/// Which quota rule a tier represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TierKind {
    /// Requests per 60 seconds
    PerMinute,
    /// Requests per 3600 seconds
    PerHour,
    /// Requests per configurable number of minutes
    SlidingWindow,
}

impl TierKind {
    /// Short label used in log fields and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::PerMinute => "per_minute",
            TierKind::PerHour => "per_hour",
            TierKind::SlidingWindow => "sliding_window",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quota rule: at most `limit` admissions within `window`.
///
/// A tier without a limit is disabled and never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    kind: TierKind,
    limit: Option<NonZeroU32>,
    window: Duration,
}

impl Tier {
    /// Create a tier, validating the limit and window.
    ///
    /// # Errors
    /// Returns `PolicyError::ZeroLimit` if `limit` is `Some(0)`,
    /// `PolicyError::ZeroWindow` if the window is shorter than one second and
    /// `PolicyError::FractionalWindow` if it is not a whole number of seconds.
    pub fn new(kind: TierKind, limit: Option<u32>, window: Duration) -> Result<Self, PolicyError> {
        let limit = match limit {
            Some(n) => Some(NonZeroU32::new(n).ok_or(PolicyError::ZeroLimit { tier: kind })?),
            None => None,
        };
        if window.as_secs() == 0 {
            return Err(PolicyError::ZeroWindow { tier: kind });
        }
        if window.subsec_nanos() != 0 {
            return Err(PolicyError::FractionalWindow { tier: kind });
        }
        Ok(Self {
            kind,
            limit,
            window,
        })
    }

    /// The rule this tier represents.
    pub fn kind(&self) -> TierKind {
        self.kind
    }

    /// Maximum admissions within the window, `None` if disabled.
    pub fn limit(&self) -> Option<NonZeroU32> {
        self.limit
    }

    /// Length of the sliding window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether this tier takes part in evaluation.
    pub fn is_enabled(&self) -> bool {
        self.limit.is_some()
    }
}

/// Error returned when a policy fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// A configured limit was zero
    ZeroLimit {
        /// The offending tier
        tier: TierKind,
    },
    /// A window was shorter than one second
    ZeroWindow {
        /// The offending tier
        tier: TierKind,
    },
    /// A window was not a whole number of seconds
    FractionalWindow {
        /// The offending tier
        tier: TierKind,
    },
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::ZeroLimit { tier } => {
                write!(f, "{} limit must be greater than 0", tier)
            }
            PolicyError::ZeroWindow { tier } => {
                write!(f, "{} window must be at least one second", tier)
            }
            PolicyError::FractionalWindow { tier } => {
                write!(f, "{} window must be a whole number of seconds", tier)
            }
        }
    }
}

impl std::error::Error for PolicyError {}

/// Immutable set of quota tiers and the switches that govern them.
///
/// Enabled tiers are kept in evaluation order: ascending window length, ties
/// broken by declaration order (per-minute, per-hour, sliding window). When
/// several tiers are breached at once, the first in this order is reported.
///
/// # Example
/// ```
/// use request_throttle::{Policy, TierKind};
///
/// let policy = Policy::builder()
///     .per_minute(Some(10))
///     .per_hour(Some(50))
///     .sliding_window(None, 180)
///     .scope_global(true)
///     .build()
///     .unwrap();
///
/// let kinds: Vec<_> = policy.enabled_tiers().map(|t| t.kind()).collect();
/// assert_eq!(kinds, vec![TierKind::PerMinute, TierKind::PerHour]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    tiers: Vec<Tier>,
    scope_global: bool,
    exempt_admins: bool,
}

impl Policy {
    /// Start building a policy. All tiers start disabled.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Assemble a policy from already validated tiers.
    ///
    /// Callers pass at most one tier per kind; the builder guarantees it.
    pub(crate) fn new(tiers: Vec<Tier>, scope_global: bool, exempt_admins: bool) -> Self {
        let mut tiers = tiers;
        // Stable: equal windows keep declaration order.
        tiers.sort_by_key(|t| t.window);
        Self {
            tiers,
            scope_global,
            exempt_admins,
        }
    }

    /// The "permit everything" policy: no tier enabled.
    pub fn unlimited() -> Self {
        Self::new(Vec::new(), false, false)
    }

    /// All tiers, enabled or not, in evaluation order.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Enabled tiers in evaluation order.
    pub fn enabled_tiers(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter().filter(|t| t.is_enabled())
    }

    /// Whether counts aggregate across all resources of a user.
    pub fn scope_global(&self) -> bool {
        self.scope_global
    }

    /// Whether admins bypass every tier.
    pub fn exempt_admins(&self) -> bool {
        self.exempt_admins
    }

    /// Longest enabled window, or `None` when nothing is limited.
    ///
    /// History older than this is never consulted and is pruned.
    pub fn max_window(&self) -> Option<Duration> {
        self.enabled_tiers().map(|t| t.window).max()
    }

    /// Whether any tier is enabled.
    pub fn is_limited(&self) -> bool {
        self.enabled_tiers().next().is_some()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Builder for [`Policy`].
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    per_minute: Option<u32>,
    per_hour: Option<u32>,
    sliding_window: Option<(Option<u32>, u32)>,
    scope_global: bool,
    exempt_admins: bool,
}

impl PolicyBuilder {
    /// Limit requests per 60 seconds. `None` disables the tier.
    pub fn per_minute(mut self, limit: Option<u32>) -> Self {
        self.per_minute = limit;
        self
    }

    /// Limit requests per 3600 seconds. `None` disables the tier.
    pub fn per_hour(mut self, limit: Option<u32>) -> Self {
        self.per_hour = limit;
        self
    }

    /// Limit requests within a window of `minutes`. `None` disables the tier,
    /// though `minutes` is still validated.
    pub fn sliding_window(mut self, limit: Option<u32>, minutes: u32) -> Self {
        self.sliding_window = Some((limit, minutes));
        self
    }

    /// Aggregate counts across all resources of a user.
    pub fn scope_global(mut self, global: bool) -> Self {
        self.scope_global = global;
        self
    }

    /// Let admins bypass every tier.
    pub fn exempt_admins(mut self, exempt: bool) -> Self {
        self.exempt_admins = exempt;
        self
    }

    /// Validate and build the policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if any present limit is zero or the sliding
    /// window is zero minutes long.
    pub fn build(self) -> Result<Policy, PolicyError> {
        let mut tiers = vec![
            Tier::new(TierKind::PerMinute, self.per_minute, MINUTE)?,
            Tier::new(TierKind::PerHour, self.per_hour, HOUR)?,
        ];
        if let Some((limit, minutes)) = self.sliding_window {
            let window = Duration::from_secs(u64::from(minutes) * 60);
            tiers.push(Tier::new(TierKind::SlidingWindow, limit, window)?);
        }
        Ok(Policy::new(tiers, self.scope_global, self.exempt_admins))
    }
}
