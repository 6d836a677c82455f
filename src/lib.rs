//! # request-throttle
//!
//! Multi-tier request admission control with sliding time windows.
//!
//! For every incoming request the [`AdmissionController`] decides whether to
//! admit or reject it under several simultaneous quota tiers (per minute, per
//! hour, and a configurable sliding window), tracked per user and optionally
//! per resource. History expires with time and is pruned lazily.
//!
//! ## Quick Start
//!
//! ```rust
//! use request_throttle::{Decision, InMemoryController, Policy, Role, Subject};
//! use std::time::{Duration, Instant};
//!
//! let policy = Policy::builder()
//!     .per_minute(Some(2))
//!     .per_hour(Some(50))
//!     .scope_global(false)
//!     .build()
//!     .unwrap();
//!
//! let limiter = InMemoryController::builder().with_policy(policy).build();
//! let subject = Subject::new("alice", "gpt-4").unwrap();
//! let t0 = Instant::now();
//!
//! assert!(limiter.evaluate(&subject, Role::User, t0).is_admitted());
//! assert!(limiter.evaluate(&subject, Role::User, t0 + Duration::from_secs(10)).is_admitted());
//!
//! match limiter.evaluate(&subject, Role::User, t0 + Duration::from_secs(20)) {
//!     Decision::Admitted => unreachable!(),
//!     Decision::Rejected(rejection) => {
//!         assert_eq!(rejection.current_count, 2);
//!         assert_eq!(rejection.retry_after, Duration::from_secs(40));
//!         // "Rate limit exceeded: 2 requests in the last minute. Try again in 40 seconds."
//!         println!("{}", rejection);
//!     }
//! }
//! ```
//!
//! ## Scopes
//!
//! With `scope_global(true)` a user's requests count against the tiers no
//! matter which resource they target. With `scope_global(false)` every
//! `(user, resource)` pair has its own quota. History is always stored per
//! pair, so switching scope on a live controller keeps both views accurate.
//!
//! ## Admins
//!
//! With `exempt_admins(true)` callers with [`Role::Admin`] are admitted
//! without evaluation and nothing is recorded for them.
//!
//! ## Concurrency
//!
//! [`AdmissionController::evaluate`] is safe to call from many threads. The
//! whole prune, count, record sequence runs while holding the user's storage
//! entry exclusively, so two concurrent requests from one user can never
//! both be admitted past a limit. Different users only contend when their
//! keys share a shard.
//!
//! ## Configuration
//!
//! [`PolicyConfig`] deserializes the flat settings hosts usually expose
//! (`requests_per_minute`, `requests_per_hour`, `sliding_window_limit`,
//! `sliding_window_minutes`, `global_limit`, `enabled_for_admins`) and
//! validates them into a [`Policy`]. A running controller takes a new policy
//! through [`AdmissionController::replace_policy`].
//!
//! ## Logging
//!
//! Rejections are logged at `DEBUG` and policy changes at `INFO` through the
//! `tracing` facade; install any subscriber to see them.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    decision::{format_secs, Decision, Rejection, TierUsage},
    history::{RequestHistory, WindowStats},
    policy::{Policy, PolicyBuilder, PolicyError, Tier, TierKind, HOUR, MINUTE},
    subject::{ResourceId, Role, Subject, SubjectError, UserId, DEFAULT_RESOURCE},
};

pub use application::{
    controller::AdmissionController,
    metrics::{Metrics, MetricsSnapshot, TierRejections},
    ports::{Clock, Storage},
    registry::{HistoryRegistry, UserHistory},
};

pub use infrastructure::{
    builder::{AdmissionControllerBuilder, InMemoryController},
    clock::SystemClock,
    config::{ConfigError, PolicyConfig},
    storage::ShardedStorage,
};
