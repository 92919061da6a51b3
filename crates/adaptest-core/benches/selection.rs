use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use adaptest_core::model::{BankRecord, DifficultyTier};
use adaptest_core::schedule::TopicRotation;
use adaptest_core::source::{QuestionBank, StaticBankSource};
use adaptest_core::traits::QuestionRequest;

fn make_bank(size: usize) -> QuestionBank {
    let records = (0..size)
        .map(|i| BankRecord {
            id: format!("q{i}"),
            question: format!("Question {i}?"),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            answer: (i % 4) as u8,
            domain: Some((i % 8) as u8 + 1),
            difficulty: Some(DifficultyTier::ALL[i % 3]),
            topic: None,
            explanation: Some("Because.".into()),
        })
        .collect();
    QuestionBank::new(records)
}

fn bench_bank_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("bank_selection");
    let source = StaticBankSource::new(Arc::new(make_bank(2_000)));
    let mut rng = StdRng::seed_from_u64(42);

    let fresh = QuestionRequest {
        domain_id: 4,
        tier: DifficultyTier::Hard,
        topic: "VPN".into(),
        exclude_ids: vec![],
        seed: 0,
    };
    group.bench_function("exact_match", |b| {
        b.iter(|| source.select_with(black_box(&fresh), &mut rng).map(|(t, _)| t))
    });

    // 75 asked questions, all from the requested domain's exact pool.
    let used = QuestionRequest {
        exclude_ids: (0..75).map(|i| format!("q{}", 3 + i * 24)).collect(),
        seed: 0,
        ..fresh.clone()
    };
    group.bench_function("with_exclusions", |b| {
        b.iter(|| source.select_with(black_box(&used), &mut rng).map(|(t, _)| t))
    });

    group.finish();
}

fn bench_topic_rotation(c: &mut Criterion) {
    let topics = [
        "VPN", "TLS", "OSI model", "firewalls", "IPSec", "wireless security", "DNS security",
    ];
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("topic_pick", |b| {
        let mut rot = TopicRotation::new();
        b.iter(|| {
            if let Some(t) = rot.pick(black_box(&topics), &mut rng) {
                rot.record(t);
            }
        })
    });
}

criterion_group!(benches, bench_bank_selection, bench_topic_rotation);
criterion_main!(benches);
