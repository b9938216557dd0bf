//! # Sync Engine Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Round planning | `plan_round` + `next_frontier` for large rounds |
//! | Ingestion | one orchestrator round against the mock node and memory store |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

use ix_01_sync_engine::{
    next_frontier, plan_round, MemoryBlockStore, MockNodeClient, SyncConfig, SyncOrchestrator,
};

fn bench_round_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("ix-01-round-planning");

    for concurrent in [1usize, 5, 50] {
        group.bench_with_input(
            BenchmarkId::new("plan_and_advance", concurrent),
            &concurrent,
            |b, &concurrent| {
                b.iter(|| {
                    let windows = plan_round(black_box(1_000), 1_000_000, 100, concurrent);
                    black_box(next_frontier(1_000, &windows))
                })
            },
        );
    }
    group.finish();
}

fn bench_round_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ix-01-ingestion");
    group.measurement_time(Duration::from_secs(10));
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    for txs in [0usize, 10] {
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("round_100_blocks", txs), &txs, |b, &txs| {
            let node = Arc::new(MockNodeClient::with_chain(100, txs));
            b.iter(|| {
                runtime.block_on(async {
                    let config = SyncConfig {
                        batch_size: 20,
                        concurrent_batches: 5,
                        ..SyncConfig::for_testing()
                    };
                    let store = Arc::new(MemoryBlockStore::new());
                    let mut orch = SyncOrchestrator::new(config, Arc::clone(&node), store, 0);
                    black_box(orch.step().await)
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_round_planning, bench_round_ingestion);
criterion_main!(benches);
