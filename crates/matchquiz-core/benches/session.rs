use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use matchquiz_core::carry::InputEvent;
use matchquiz_core::session::{MatchingSession, SessionConfig};
use matchquiz_core::targets::{DropZoneLayout, Point};

fn new_session(n: usize) -> MatchingSession {
    let prompts: Vec<String> = (0..n).map(|i| format!("Prompt {i}")).collect();
    let answers: Vec<String> = (0..n).map(|i| format!("Answer {i}")).collect();
    let mut rng = StdRng::seed_from_u64(7);
    MatchingSession::new(prompts, answers, SessionConfig::default(), &mut rng)
        .expect("valid session")
}

/// Drag every answer onto its slot, one per second.
fn play_to_completion(session: &mut MatchingSession) {
    let answers = session.answers().to_vec();
    for (slot, answer) in answers.iter().enumerate() {
        let now = Duration::from_secs(slot as u64);
        let item = session.position_of(answer).expect("answer on offer");
        let layout = DropZoneLayout::new();
        session.handle(now, InputEvent::DragStart { item }, &layout);
        session.handle(now, InputEvent::Drop { slot }, &layout);
    }
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    group.bench_function("play_8_pairs", |b| {
        b.iter_batched(
            || new_session(8),
            |mut session| {
                play_to_completion(&mut session);
                session.advance_to(Duration::from_secs(30))
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("timeout_drain", |b| {
        b.iter_batched(
            || new_session(8),
            |mut session| session.advance_to(black_box(Duration::from_secs(600))),
            BatchSize::SmallInput,
        )
    });

    let layout = DropZoneLayout::column(32, Point::new(0.0, 0.0), 400.0, 48.0);
    group.bench_function("touch_move_hit_test", |b| {
        b.iter_batched(
            || {
                let mut session = new_session(32);
                session.handle(Duration::ZERO, InputEvent::touch_start(0, 10.0, 10.0), &layout);
                session
            },
            |mut session| {
                for row in 0..32 {
                    let y = row as f64 * 48.0 + 24.0;
                    session.handle(Duration::ZERO, InputEvent::touch_move(200.0, y), &layout);
                }
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_session);
criterion_main!(benches);
