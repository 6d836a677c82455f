//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and owns the mutable state:
//! - History registry (per-user request history)
//! - Admission controller (decision making)
//! - Metrics (admission counters)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod controller;
pub mod metrics;
pub mod ports;
pub mod registry;
