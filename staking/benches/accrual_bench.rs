use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sova_staking::accrual::{accrued, settle};
use sova_staking::{RewardParams, UserStake};
use sova_types::Timestamp;

fn make_stake(locked: bool) -> UserStake {
    UserStake {
        tier1: 1_000_000_000_000,
        tier2: 400_000_000_000,
        lock_end: Timestamp::new(if locked { 15_552_000 } else { 0 }),
        lock_multiplier_bps: if locked { 15_000 } else { 10_000 },
        ..UserStake::new(Timestamp::new(0))
    }
}

fn bench_accrued(c: &mut Criterion) {
    let mut group = c.benchmark_group("accrued");
    let params = RewardParams::default();

    for (label, locked) in [("unlocked", false), ("locked", true)] {
        let stake = make_stake(locked);
        group.bench_with_input(BenchmarkId::new("one_year", label), &stake, |b, stake| {
            b.iter(|| black_box(accrued(black_box(stake), black_box(&params), Timestamp::new(31_536_000))));
        });
    }

    group.finish();
}

fn bench_settle_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle_sequence");
    let params = RewardParams::default();

    for steps in [1u64, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("daily_settles", steps), &steps, |b, &steps| {
            b.iter(|| {
                let mut stake = make_stake(true);
                for day in 1..=steps {
                    if let Some(next) = settle(&stake, &params, Timestamp::new(day * 86_400)) {
                        stake = next;
                    }
                }
                black_box(stake)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_accrued, bench_settle_sequence);
criterion_main!(benches);
