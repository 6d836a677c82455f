use request_throttle::{
    Decision, InMemoryController, Policy, Role, Subject, SubjectError, TierKind,
};
use std::time::{Duration, Instant};

fn at(base: Instant, secs: u64) -> Instant {
    base + Duration::from_secs(secs)
}

fn per_minute(limit: u32, global: bool) -> InMemoryController {
    InMemoryController::builder()
        .with_policy(
            Policy::builder()
                .per_minute(Some(limit))
                .per_hour(None)
                .sliding_window(None, 180)
                .scope_global(global)
                .build()
                .unwrap(),
        )
        .build()
}

fn subject(user: &str, resource: &str) -> Subject {
    Subject::new(user, resource).unwrap()
}

#[test]
fn test_per_resource_scenario() {
    let limiter = per_minute(2, false);
    let base = Instant::now();
    let s = subject("u1", "m1");

    assert_eq!(limiter.evaluate(&s, Role::User, at(base, 0)), Decision::Admitted);
    assert_eq!(limiter.evaluate(&s, Role::User, at(base, 10)), Decision::Admitted);

    match limiter.evaluate(&s, Role::User, at(base, 20)) {
        Decision::Rejected(rejection) => {
            assert_eq!(rejection.current_count, 2);
            assert_eq!(rejection.retry_after_secs(), 40);
            assert_eq!(rejection.violated_tier.kind(), TierKind::PerMinute);
        }
        Decision::Admitted => panic!("third request within a minute must be rejected"),
    }

    assert_eq!(limiter.evaluate(&s, Role::User, at(base, 61)), Decision::Admitted);
}

#[test]
fn test_global_scope_scenario() {
    let limiter = per_minute(2, true);
    let base = Instant::now();

    assert!(limiter
        .evaluate(&subject("u1", "m1"), Role::User, at(base, 0))
        .is_admitted());
    assert!(limiter
        .evaluate(&subject("u1", "m2"), Role::User, at(base, 5))
        .is_admitted());

    // m3 has no history of its own, but the user is at the limit.
    let decision = limiter.evaluate(&subject("u1", "m3"), Role::User, at(base, 10));
    let rejection = decision.rejection().copied().unwrap();
    assert_eq!(rejection.current_count, 2);
    assert_eq!(rejection.retry_after, Duration::from_secs(50));
}

#[test]
fn test_per_resource_isolation() {
    let limiter = per_minute(1, false);
    let now = Instant::now();

    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_admitted());
    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_rejected());

    // Same user, other resource: unaffected.
    assert!(limiter.evaluate(&subject("a", "y"), Role::User, now).is_admitted());
    // Other user, same resource: unaffected.
    assert!(limiter.evaluate(&subject("b", "x"), Role::User, now).is_admitted());
}

#[test]
fn test_global_scope_shares_quota_across_resources() {
    let limiter = per_minute(1, true);
    let now = Instant::now();

    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_admitted());
    assert!(limiter.evaluate(&subject("a", "y"), Role::User, now).is_rejected());
    assert!(limiter.evaluate(&subject("b", "y"), Role::User, now).is_admitted());
}

#[test]
fn test_switching_scope_keeps_per_resource_counts() {
    let limiter = per_minute(2, true);
    let now = Instant::now();

    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_admitted());
    assert!(limiter.evaluate(&subject("a", "y"), Role::User, now).is_admitted());
    assert!(limiter.evaluate(&subject("a", "z"), Role::User, now).is_rejected());

    limiter.replace_policy(
        Policy::builder()
            .per_minute(Some(2))
            .scope_global(false)
            .build()
            .unwrap(),
    );

    // Per resource, x holds one admission and has room for one more.
    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_admitted());
    assert!(limiter.evaluate(&subject("a", "x"), Role::User, now).is_rejected());
}

#[test]
fn test_admin_traffic_never_recorded() {
    let limiter = InMemoryController::builder()
        .with_policy(
            Policy::builder()
                .per_minute(Some(1))
                .exempt_admins(true)
                .build()
                .unwrap(),
        )
        .build();
    let base = Instant::now();
    let s = subject("admin", "m1");

    for secs in 0..50 {
        assert!(limiter.evaluate(&s, Role::Admin, at(base, secs)).is_admitted());
    }

    assert_eq!(limiter.tracked_users(), 0);
    assert!(limiter.usage(&s, at(base, 50)).iter().all(|u| u.count == 0));
}

#[test]
fn test_sliding_window_tier() {
    let limiter = InMemoryController::builder()
        .with_policy(
            Policy::builder()
                .per_minute(Some(10))
                .per_hour(Some(100))
                .sliding_window(Some(3), 180)
                .build()
                .unwrap(),
        )
        .build();
    let base = Instant::now();
    let s = subject("u1", "m1");

    // One request per hour for three hours.
    for hour in 0..3 {
        assert!(limiter.evaluate(&s, Role::User, at(base, hour * 3600)).is_admitted());
    }

    let decision = limiter.evaluate(&s, Role::User, at(base, 3 * 3600 - 1));
    let rejection = decision.rejection().copied().unwrap();
    assert_eq!(rejection.violated_tier.kind(), TierKind::SlidingWindow);
    assert_eq!(rejection.current_count, 3);
    assert_eq!(rejection.retry_after, Duration::from_secs(1));

    // The first request leaves the 3 hour window.
    assert!(limiter.evaluate(&s, Role::User, at(base, 3 * 3600)).is_admitted());
}

#[test]
fn test_rejection_message_for_pipeline() {
    let limiter = per_minute(2, false);
    let base = Instant::now();
    let s = subject("u1", "m1");

    limiter.evaluate(&s, Role::User, base);
    limiter.evaluate(&s, Role::User, at(base, 10));
    let decision = limiter.evaluate(&s, Role::User, at(base, 20));

    assert_eq!(
        decision.rejection().map(ToString::to_string).unwrap(),
        "Rate limit exceeded: 2 requests in the last minute. Try again in 40 seconds."
    );
}

#[test]
fn test_replay_is_deterministic() {
    let base = Instant::now();
    let requests: Vec<(Subject, u64)> = (0..40)
        .map(|i| {
            let user = format!("u{}", i % 3);
            let resource = format!("m{}", i % 2);
            (subject(&user, &resource), i * 7)
        })
        .collect();

    let run = || {
        let limiter = InMemoryController::builder()
            .with_policy(
                Policy::builder()
                    .per_minute(Some(3))
                    .per_hour(Some(8))
                    .scope_global(true)
                    .build()
                    .unwrap(),
            )
            .build();
        requests
            .iter()
            .map(|(s, secs)| limiter.evaluate(s, Role::User, at(base, *secs)))
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(first.iter().any(Decision::is_rejected));
    assert!(first.iter().any(Decision::is_admitted));
}

#[test]
fn test_empty_identifiers_rejected_before_evaluation() {
    assert_eq!(Subject::new("", "m1").unwrap_err(), SubjectError::EmptyUserId);
    assert_eq!(Subject::new("u1", "").unwrap_err(), SubjectError::EmptyResourceId);
    assert_eq!(Subject::for_user("u1").unwrap().resource().as_str(), "default");
}

#[test]
fn test_rejections_logged_without_panicking() {
    use tracing_subscriber::EnvFilter;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("request_throttle=trace"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let limiter = per_minute(1, false);
        let now = Instant::now();
        let s = subject("u1", "m1");

        assert!(limiter.evaluate(&s, Role::User, now).is_admitted());
        assert!(limiter.evaluate(&s, Role::User, now).is_rejected());
        limiter.replace_policy(Policy::unlimited());
        assert_eq!(limiter.prune_idle(now), 1);
    });
}
