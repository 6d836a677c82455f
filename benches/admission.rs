use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use request_throttle::{InMemoryController, Policy, Role, Subject};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn controller(policy: Policy) -> InMemoryController {
    InMemoryController::builder().with_policy(policy).build()
}

fn three_tier(global: bool) -> Policy {
    Policy::builder()
        .per_minute(Some(10))
        .per_hour(Some(50))
        .sliding_window(Some(100), 180)
        .scope_global(global)
        .build()
        .unwrap()
}

/// Benchmark single-threaded decision throughput
fn bench_single_threaded_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1000));

    for (name, global) in [("per_resource", false), ("global", true)] {
        group.bench_with_input(BenchmarkId::new("evaluate", name), &global, |b, &global| {
            let limiter = controller(three_tier(global));
            let subjects: Vec<_> = (0..4)
                .map(|i| Subject::new("bench", format!("model_{}", i)).unwrap())
                .collect();
            let base = Instant::now();

            b.iter(|| {
                for i in 0..1000u64 {
                    let s = &subjects[(i % 4) as usize];
                    let now = base + Duration::from_millis(i * 500);
                    black_box(limiter.evaluate(black_box(s), Role::User, now));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark rejections against a saturated history
fn bench_saturated_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("saturated");
    group.throughput(Throughput::Elements(1000));

    for history_len in [10u32, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("history", history_len),
            &history_len,
            |b, &history_len| {
                let limiter = controller(
                    Policy::builder()
                        .sliding_window(Some(history_len), 60)
                        .build()
                        .unwrap(),
                );
                let s = Subject::for_user("bench").unwrap();
                let now = Instant::now();
                for _ in 0..history_len {
                    limiter.evaluate(&s, Role::User, now);
                }

                b.iter(|| {
                    for _ in 0..1000 {
                        black_box(limiter.evaluate(black_box(&s), Role::User, now));
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark multi-threaded concurrent throughput
fn bench_concurrent_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let limiter = Arc::new(controller(three_tier(true)));
                    let now = Instant::now();

                    let mut handles = vec![];
                    for i in 0..num_threads {
                        let limiter = Arc::clone(&limiter);
                        let handle = std::thread::spawn(move || {
                            // Each thread uses its own user to avoid contention
                            let s = Subject::for_user(format!("user_{}", i)).unwrap();
                            for _ in 0..1000 {
                                black_box(limiter.evaluate(black_box(&s), Role::User, now));
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark growth of the user map
fn bench_registry_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_scaling");

    for num_users in [100, 1000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert", num_users),
            num_users,
            |b, &num_users| {
                b.iter(|| {
                    let limiter = controller(three_tier(false));
                    let now = Instant::now();

                    for i in 0..num_users {
                        let s = Subject::for_user(format!("user_{}", i)).unwrap();
                        limiter.evaluate(&s, Role::User, now);
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded_throughput,
    bench_saturated_history,
    bench_concurrent_throughput,
    bench_registry_size,
);
criterion_main!(benches);
