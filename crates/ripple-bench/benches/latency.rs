//! Latency benchmarks for Ripple.
//!
//! These benchmarks focus on single-message and membership latency.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ripple_bench::{payload, runtime};
use ripple_core::Group;
use std::time::{Duration, Instant};

/// Benchmark publish + receive latency between two members.
fn bench_round_trip(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("round_trip");

    group.bench_function("two_members", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let members = Group::new();
                let (publisher, _publisher_out) = members.join(Duration::from_secs(1)).await;
                let (listener, mut listener_out) = members.join(Duration::from_secs(1)).await;
                let message = payload(64);

                let start = Instant::now();
                for _ in 0..iters {
                    publisher.send(black_box(message.clone())).await.unwrap();
                    black_box(listener_out.recv().await);
                }
                let elapsed = start.elapsed();

                publisher.close();
                listener.close();
                elapsed
            })
        });
    });

    group.finish();
}

/// Benchmark joining and leaving a group.
fn bench_membership(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("membership");

    group.bench_function("join_leave", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let members = Group::<bytes::Bytes>::new();

                let start = Instant::now();
                for _ in 0..iters {
                    let (inbound, mut outbound) = members.join(Duration::from_secs(1)).await;
                    inbound.close();
                    // Ends once the relay has deregistered the member
                    while outbound.recv().await.is_some() {}
                }
                start.elapsed()
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_round_trip, bench_membership);
criterion_main!(benches);
