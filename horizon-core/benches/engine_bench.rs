//! Criterion benchmarks for the per-tick hot paths.
//!
//! Benchmarks:
//! 1. Single engine ticks (window update, stddev, transition)
//! 2. Full trader decision stage, sequential vs rayon
//! 3. Reconciliation
//! 4. Warm-start alignment

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use horizon_core::config::{HorizonConfig, TraderConfig};
use horizon_core::engine::{align, DecisionEngine, ExecutionReconciler};
use horizon_core::paper::{MomentumOracle, RandomWalk};
use horizon_core::trader::Trader;

// ── Helpers ──────────────────────────────────────────────────────────

fn prices(n: usize) -> Vec<f64> {
    RandomWalk::new(42, 100.0, 0.01).take(n).collect()
}

fn horizons(n: usize) -> Vec<HorizonConfig> {
    (1..=n)
        .map(|i| HorizonConfig::new(format!("h{i}"), 30 * i, (10 * i) as u32))
        .collect()
}

// ── 1. Engine ticks ──────────────────────────────────────────────────

fn bench_engine_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_ticks");
    let oracle = MomentumOracle::default();

    for &k in &[30usize, 90, 360] {
        let series = prices(2_000);
        group.bench_with_input(BenchmarkId::new("k", k), &k, |b, &k| {
            b.iter(|| {
                let mut engine = DecisionEngine::new(HorizonConfig::new("bench", k, 30)).unwrap();
                for &price in &series {
                    let _ = engine.tick(black_box(price), &oracle);
                }
                engine.signal()
            });
        });
    }

    group.finish();
}

// ── 2. Trader decision stage ─────────────────────────────────────────

fn bench_trader(c: &mut Criterion) {
    let mut group = c.benchmark_group("trader_on_price");
    let oracle = MomentumOracle::default();
    let series = prices(1_000);

    for parallel in [false, true] {
        let label = if parallel { "rayon" } else { "sequential" };
        group.bench_function(format!("12_horizons_{label}"), |b| {
            b.iter(|| {
                let mut config = TraderConfig::new(horizons(12));
                config.parallel_engines = parallel;
                let mut trader = Trader::new(config).unwrap();
                for &price in &series {
                    black_box(trader.on_price(price, &oracle));
                }
            });
        });
    }

    group.finish();
}

// ── 3. Reconciliation ────────────────────────────────────────────────

fn bench_reconcile(c: &mut Criterion) {
    let reconciler = ExecutionReconciler::new(0.001).with_min_order_size(Some(0.001));
    c.bench_function("reconcile_1000", |b| {
        b.iter(|| {
            let mut placed = 0usize;
            for i in 0..1_000i64 {
                let target = (i % 9 - 4) as f64;
                let actual = reconciler.lots_from_exposure(((i + 3) % 7 - 3) as f64 * 0.001);
                if reconciler.reconcile(black_box(target), black_box(actual)).is_some() {
                    placed += 1;
                }
            }
            placed
        });
    });
}

// ── 4. Warm-start alignment ──────────────────────────────────────────

fn bench_align(c: &mut Criterion) {
    let history = prices(5_000);
    let configs = horizons(12);
    c.bench_function("align_12_horizons", |b| {
        b.iter(|| {
            configs
                .iter()
                .filter_map(|h| align(black_box(&history), h).ok())
                .map(|w| w.len())
                .sum::<usize>()
        });
    });
}

criterion_group!(
    benches,
    bench_engine_ticks,
    bench_trader,
    bench_reconcile,
    bench_align,
);
criterion_main!(benches);
