//! Basic example of per-minute admission control.
//!
//! Replays the classic scenario: two requests are admitted, the third within
//! the same minute is rejected with a retry hint, and one second after the
//! first request ages out the caller is admitted again.
//!
//! Run with `RUST_LOG=request_throttle=debug` to see the controller's logs.

use request_throttle::{Decision, InMemoryController, Policy, Role, Subject};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let policy = Policy::builder()
        .per_minute(Some(2))
        .build()
        .expect("valid policy");
    let limiter = InMemoryController::builder().with_policy(policy).build();

    println!("=== Basic Admission Example ===\n");
    println!("Policy: 2 requests per minute per (user, model)\n");

    let subject = Subject::new("alice", "gpt-4").expect("non-empty ids");
    let start = Instant::now();

    for t in [0, 10, 20, 61] {
        let now = start + Duration::from_secs(t);
        match limiter.evaluate(&subject, Role::User, now) {
            Decision::Admitted => println!("t={:>3}s  admitted", t),
            Decision::Rejected(rejection) => println!("t={:>3}s  {}", t, rejection),
        }
    }

    let metrics = limiter.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "admitted: {}, rejected: {}",
        metrics.requests_admitted, metrics.requests_rejected
    );
}
