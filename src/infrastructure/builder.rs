//! Builder wiring the in-memory admission controller.
//!
//! Assembles an [`AdmissionController`] over [`ShardedStorage`] with the
//! system clock unless told otherwise.

use crate::application::{
    controller::AdmissionController, metrics::Metrics, ports::Clock, registry::HistoryRegistry,
    registry::UserHistory,
};
use crate::domain::{policy::Policy, subject::UserId};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::{ConfigError, PolicyConfig};
use crate::infrastructure::storage::ShardedStorage;
use std::sync::Arc;

/// Admission controller backed by in-process sharded storage.
pub type InMemoryController = AdmissionController<Arc<ShardedStorage<UserId, UserHistory>>>;

/// Builder for constructing an [`InMemoryController`].
///
/// # Example
/// ```
/// use request_throttle::{InMemoryController, Policy, Role, Subject};
/// use std::time::Instant;
///
/// let limiter = InMemoryController::builder()
///     .with_policy(Policy::builder().per_minute(Some(1)).build().unwrap())
///     .build();
///
/// let subject = Subject::new("alice", "gpt-4").unwrap();
/// let now = Instant::now();
/// assert!(limiter.evaluate(&subject, Role::User, now).is_admitted());
/// assert!(limiter.evaluate(&subject, Role::User, now).is_rejected());
/// ```
#[derive(Debug, Default)]
pub struct AdmissionControllerBuilder {
    policy: Policy,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Metrics>,
}

impl AdmissionControllerBuilder {
    /// Create a builder with the unlimited policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the initial policy from host settings.
    ///
    /// # Errors
    /// Returns `ConfigError::Policy` if the settings are invalid.
    pub fn with_config(self, config: PolicyConfig) -> Result<Self, ConfigError> {
        Ok(self.with_policy(config.into_policy()?))
    }

    /// Set the clock used by `check`. Defaults to the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the controller.
    pub fn build(self) -> InMemoryController {
        let registry = HistoryRegistry::new(Arc::new(ShardedStorage::new()));
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        AdmissionController::new(
            registry,
            self.policy,
            clock,
            self.metrics.unwrap_or_default(),
        )
    }
}

impl InMemoryController {
    /// Start building an in-memory controller.
    pub fn builder() -> AdmissionControllerBuilder {
        AdmissionControllerBuilder::new()
    }
}
