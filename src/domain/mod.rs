//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of admission control:
//! - Quota policies and their tiers
//! - Subject identity and caller role
//! - Per-subject request history with time-based expiry
//! - Admission decisions and user-facing rejection messages
//!
//! All types in this layer are pure and easily testable.

pub mod decision;
pub mod history;
pub mod policy;
pub mod subject;
