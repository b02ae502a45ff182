//! Fan-out benchmarks for Ripple.
//!
//! These benchmarks measure how publish cost scales with group size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ripple_bench::{join_drainers, leave_all, payload, runtime};
use ripple_core::{Group, GroupConfig};
use std::time::{Duration, Instant};

/// Benchmark publishing to draining receivers.
fn bench_fanout(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("fanout");

    for size in [1, 16, 256, 1024].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let members = Group::new();
                    let (publisher, _publisher_out) = members.join(Duration::from_secs(1)).await;
                    let drainers = join_drainers(&members, size, Duration::from_secs(1)).await;
                    let message = payload(64);

                    let start = Instant::now();
                    for _ in 0..iters {
                        publisher.send(black_box(message.clone())).await.unwrap();
                    }
                    let elapsed = start.elapsed();

                    publisher.close();
                    leave_all(drainers).await;
                    elapsed
                })
            });
        });
    }

    group.finish();
}

/// Benchmark publishing with buffered outbound handles.
fn bench_buffered_fanout(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("buffered_fanout");

    for capacity in [1, 16, 256].iter() {
        group.throughput(Throughput::Elements(256));
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                b.iter_custom(|iters| {
                    rt.block_on(async {
                        let config = GroupConfig::default().outbound_capacity(capacity);
                        let members = Group::with_config(config);
                        let (publisher, _publisher_out) = members.join(Duration::ZERO).await;
                        let drainers = join_drainers(&members, 256, Duration::ZERO).await;
                        let message = payload(64);

                        let start = Instant::now();
                        for _ in 0..iters {
                            publisher.send(black_box(message.clone())).await.unwrap();
                        }
                        let elapsed = start.elapsed();

                        publisher.close();
                        leave_all(drainers).await;
                        elapsed
                    })
                });
            },
        );
    }

    group.finish();
}

/// Benchmark publishing while one receiver never drains.
fn bench_stalled_receiver(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("stalled_receiver");
    group.sample_size(10);

    let timeout = Duration::from_millis(1);
    group.bench_function("1ms_budget_64_members", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let members = Group::new();
                let (publisher, _publisher_out) = members.join(timeout).await;
                let (_stalled_in, _stalled_out) = members.join(timeout).await;
                let drainers = join_drainers(&members, 63, timeout).await;
                let message = payload(64);

                let start = Instant::now();
                for _ in 0..iters {
                    publisher.send(black_box(message.clone())).await.unwrap();
                }
                let elapsed = start.elapsed();

                publisher.close();
                leave_all(drainers).await;
                elapsed
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fanout,
    bench_buffered_fanout,
    bench_stalled_receiver,
);
criterion_main!(benches);
