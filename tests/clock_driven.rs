//! Scenarios driven through `check` with a controllable clock.
//!
//! Needs the `test-helpers` feature: `cargo test --features test-helpers`.

use request_throttle::infrastructure::mocks::MockClock;
use request_throttle::{InMemoryController, Policy, PolicyConfig, Role, Subject, TierKind};
use std::sync::Arc;
use std::time::Duration;

fn controller(policy: Policy, clock: &MockClock) -> InMemoryController {
    InMemoryController::builder()
        .with_policy(policy)
        .with_clock(Arc::new(clock.clone()))
        .build()
}

#[test]
fn test_per_minute_scenario_on_clock() {
    let clock = MockClock::starting_now();
    let limiter = controller(
        Policy::builder().per_minute(Some(2)).build().unwrap(),
        &clock,
    );
    let s = Subject::new("u1", "m1").unwrap();

    assert!(limiter.check(&s, Role::User).is_admitted());

    clock.set_secs(10);
    assert!(limiter.check(&s, Role::User).is_admitted());

    clock.set_secs(20);
    let decision = limiter.check(&s, Role::User);
    let rejection = decision.rejection().copied().unwrap();
    assert_eq!(rejection.current_count, 2);
    assert_eq!(rejection.retry_after_secs(), 40);

    // Waiting exactly the advertised time is enough.
    clock.advance(rejection.retry_after);
    assert!(limiter.check(&s, Role::User).is_admitted());
}

#[test]
fn test_default_settings_over_an_afternoon() {
    let clock = MockClock::starting_now();
    let limiter = InMemoryController::builder()
        .with_config(PolicyConfig::default())
        .unwrap()
        .with_clock(Arc::new(clock.clone()))
        .build();
    let s = Subject::new("u1", "m1").unwrap();

    // Ten a minute for five minutes fills the hourly quota of fifty.
    for minute in 0..5 {
        clock.set_secs(minute * 60);
        for _ in 0..10 {
            assert!(limiter.check(&s, Role::User).is_admitted());
        }
    }

    clock.set_secs(5 * 60);
    let rejection = limiter.check(&s, Role::User).rejection().copied().unwrap();
    assert_eq!(rejection.violated_tier.kind(), TierKind::PerHour);
    assert_eq!(rejection.current_count, 50);
    assert_eq!(rejection.retry_after, Duration::from_secs(55 * 60));

    // The first minute's batch leaves the hour window.
    clock.set_secs(60 * 60);
    for _ in 0..10 {
        assert!(limiter.check(&s, Role::User).is_admitted());
    }
    let rejection = limiter.check(&s, Role::User).rejection().copied().unwrap();
    assert_eq!(rejection.violated_tier.kind(), TierKind::PerMinute);
}

#[test]
fn test_idle_users_pruned_after_longest_window() {
    let clock = MockClock::starting_now();
    let limiter = controller(
        Policy::builder()
            .per_minute(Some(5))
            .sliding_window(Some(20), 10)
            .build()
            .unwrap(),
        &clock,
    );

    for i in 0..4 {
        let s = Subject::for_user(format!("user_{}", i)).unwrap();
        assert!(limiter.check(&s, Role::User).is_admitted());
    }
    assert_eq!(limiter.tracked_users(), 4);

    clock.set_secs(9 * 60);
    assert_eq!(limiter.prune_idle(clock.at_secs(9 * 60)), 0);

    clock.set_secs(10 * 60);
    assert_eq!(limiter.prune_idle(clock.at_secs(10 * 60)), 4);
    assert_eq!(limiter.tracked_users(), 0);
}
