use criterion::{black_box, criterion_group, criterion_main, Criterion};

use matchquiz_core::scoring::{calculate_weighted_score, ScoreInput};

fn bench_weighted_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_score");

    group.bench_function("perfect", |b| {
        let input = ScoreInput {
            correct_answers: 8,
            total_questions: 8,
            time_taken: 0.0,
            time_limit: 120.0,
        };
        b.iter(|| calculate_weighted_score(black_box(&input)))
    });

    group.bench_function("partial", |b| {
        let input = ScoreInput {
            correct_answers: 3,
            total_questions: 8,
            time_taken: 97.0,
            time_limit: 120.0,
        };
        b.iter(|| calculate_weighted_score(black_box(&input)))
    });

    group.bench_function("rejected", |b| {
        let input = ScoreInput {
            correct_answers: 9,
            total_questions: 8,
            time_taken: 10.0,
            time_limit: 120.0,
        };
        b.iter(|| calculate_weighted_score(black_box(&input)))
    });

    group.finish();
}

criterion_group!(benches, bench_weighted_score);
criterion_main!(benches);
