//! Admission controller.
//!
//! The controller decides whether a request may proceed under every enabled
//! tier of the current policy and records admitted requests.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::application::registry::{HistoryRegistry, UserHistory};
use crate::domain::{
    decision::{Decision, Rejection, TierUsage},
    history::WindowStats,
    policy::Policy,
    subject::{Role, Subject, UserId},
};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Coordinates admission decisions.
///
/// The policy is held as an `Arc` snapshot: every evaluation works against
/// one snapshot from start to finish, and [`replace_policy`] swaps the whole
/// value at once.
///
/// [`replace_policy`]: AdmissionController::replace_policy
#[derive(Debug)]
pub struct AdmissionController<S>
where
    S: Storage<UserId, UserHistory>,
{
    registry: HistoryRegistry<S>,
    policy: RwLock<Arc<Policy>>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<S> AdmissionController<S>
where
    S: Storage<UserId, UserHistory>,
{
    /// Create a new controller.
    ///
    /// # Arguments
    /// * `registry` - The history registry
    /// * `policy` - Initial policy
    /// * `clock` - Clock used by [`check`](Self::check)
    /// * `metrics` - Metrics tracker
    pub fn new(
        registry: HistoryRegistry<S>,
        policy: Policy,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
    ) -> Self {
        Self {
            registry,
            policy: RwLock::new(Arc::new(policy)),
            clock,
            metrics,
        }
    }

    /// Evaluate a request at `now` and record it if admitted.
    ///
    /// Tiers are checked shortest window first; the first tier at or over
    /// its limit is reported. A rejection leaves the recorded history as it
    /// was, so repeating it yields the same verdict and count.
    ///
    /// The user's history is held exclusively from pruning through recording,
    /// so concurrent requests from one user cannot both slip under a limit.
    pub fn evaluate(&self, subject: &Subject, role: Role, now: Instant) -> Decision {
        let policy = self.policy();

        if role.is_admin() && policy.exempt_admins() {
            trace!(user = %subject.user(), "admin exempt from rate limits");
            self.metrics.record_admin_bypass();
            return Decision::Admitted;
        }

        // Nothing enabled: nothing to count, nothing worth recording.
        let Some(max_window) = policy.max_window() else {
            self.metrics.record_admitted();
            return Decision::Admitted;
        };

        let scope = if policy.scope_global() {
            None
        } else {
            Some(subject.resource())
        };

        let decision = self.registry.with_user(subject.user(), |history| {
            history.prune(now, max_window);

            for tier in policy.enabled_tiers() {
                let Some(limit) = tier.limit() else {
                    continue;
                };
                let stats = history.window_stats(scope, now, tier.window());
                if stats.count >= limit.get() as usize {
                    return Decision::Rejected(Rejection {
                        retry_after: stats.retry_after(tier.window(), now),
                        current_count: stats.count,
                        violated_tier: *tier,
                    });
                }
            }

            history.record(subject.resource(), now);
            Decision::Admitted
        });

        match &decision {
            Decision::Admitted => {
                trace!(user = %subject.user(), resource = %subject.resource(), "request admitted");
                self.metrics.record_admitted();
            }
            Decision::Rejected(rejection) => {
                debug!(
                    user = %subject.user(),
                    resource = %subject.resource(),
                    tier = %rejection.violated_tier.kind(),
                    count = rejection.current_count,
                    retry_after_secs = rejection.retry_after_secs(),
                    "request rejected"
                );
                self.metrics.record_rejected(rejection.violated_tier.kind());
            }
        }

        decision
    }

    /// Evaluate a request at the clock's current time.
    pub fn check(&self, subject: &Subject, role: Role) -> Decision {
        self.evaluate(subject, role, self.clock.now())
    }

    /// Standing of a subject against each enabled tier at `now`.
    ///
    /// Read-only: nothing is pruned or recorded.
    pub fn usage(&self, subject: &Subject, now: Instant) -> Vec<TierUsage> {
        let policy = self.policy();
        let scope = if policy.scope_global() {
            None
        } else {
            Some(subject.resource())
        };

        policy
            .enabled_tiers()
            .filter_map(|tier| {
                let limit = tier.limit()?.get() as usize;
                let stats = self
                    .registry
                    .peek_user(subject.user(), |h| h.window_stats(scope, now, tier.window()))
                    .unwrap_or_else(WindowStats::empty);
                Some(TierUsage {
                    tier: *tier,
                    count: stats.count,
                    remaining: limit.saturating_sub(stats.count),
                    resets_in: stats.retry_after(tier.window(), now),
                })
            })
            .collect()
    }

    /// Current policy snapshot.
    pub fn policy(&self) -> Arc<Policy> {
        self.policy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the policy as a unit.
    ///
    /// Recorded history is kept and judged against the new tiers from the
    /// next evaluation on.
    pub fn replace_policy(&self, policy: Policy) {
        info!(
            enabled_tiers = policy.enabled_tiers().count(),
            scope_global = policy.scope_global(),
            exempt_admins = policy.exempt_admins(),
            "rate limit policy replaced"
        );
        let mut guard = self.policy.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(policy);
    }

    /// Forget all history of one user.
    pub fn reset_user(&self, user: &UserId) -> bool {
        self.registry.remove_user(user)
    }

    /// Prune every user at `now` and drop those left without history.
    ///
    /// Evaluation already prunes lazily; this only bounds memory held for
    /// users who stopped sending requests. Returns the number dropped.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let dropped = self.registry.prune_all(now, self.policy().max_window());
        if dropped > 0 {
            debug!(dropped, remaining = self.registry.len(), "pruned idle users");
        }
        dropped
    }

    /// Number of users with recorded history.
    pub fn tracked_users(&self) -> usize {
        self.registry.len()
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &HistoryRegistry<S> {
        &self.registry
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
