//! Supermajority-arithmetic benchmarks: the one hot path every vote
//! insertion touches, under both consistency models.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use yac_core::consistency::{ConsistencyModel, SupermajorityChecker};

fn bench_has_supermajority(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_supermajority");
    for n in [4u64, 16, 64, 256] {
        for model in [ConsistencyModel::Cft, ConsistencyModel::Bft] {
            let checker = SupermajorityChecker::new(model);
            group.bench_with_input(BenchmarkId::new(format!("{model:?}"), n), &n, |b, &n| {
                b.iter(|| checker.has_supermajority(n - 1, n));
            });
        }
    }
    group.finish();
}

fn bench_can_have_supermajority(c: &mut Criterion) {
    let mut group = c.benchmark_group("can_have_supermajority");
    for n in [4u64, 16, 64, 256] {
        let vote_groups: Vec<u64> = vec![n / 3, n / 3];
        for model in [ConsistencyModel::Cft, ConsistencyModel::Bft] {
            let checker = SupermajorityChecker::new(model);
            group.bench_with_input(BenchmarkId::new(format!("{model:?}"), n), &n, |b, &n| {
                b.iter(|| checker.can_have_supermajority(&vote_groups, n));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_has_supermajority, bench_can_have_supermajority);
criterion_main!(benches);
