use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptest_core::estimator::{probability, AbilityEstimator, DISCRIMINATION, GUESSING};
use adaptest_core::model::DifficultyTier;
use adaptest_core::policy::next_difficulty;

fn bench_probability(c: &mut Criterion) {
    c.bench_function("probability", |b| {
        b.iter(|| {
            probability(
                black_box(0.37),
                black_box(1.5),
                DISCRIMINATION,
                GUESSING,
            )
        })
    });
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator");

    group.bench_function("update_75", |b| {
        b.iter(|| {
            let mut est = AbilityEstimator::new(DifficultyTier::Medium);
            for i in 0..75usize {
                let tier = next_difficulty(i, est.theta());
                est.update(tier, black_box(i % 3 != 0));
            }
            est.theta()
        })
    });

    let mut est = AbilityEstimator::new(DifficultyTier::Medium);
    for i in 0..150usize {
        est.update(DifficultyTier::ALL[i % 3], i % 2 == 0);
    }
    group.bench_function("stats_150", |b| b.iter(|| black_box(&est).stats()));

    group.finish();
}

criterion_group!(benches, bench_probability, bench_update);
criterion_main!(benches);
