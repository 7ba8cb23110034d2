use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skillbridge_core::grading::{grade_locally, MicroQuestion, MicroQuiz, QuizAnswer, QuizPayload};
use skillbridge_core::model::{Difficulty, Lesson, Topic};
use skillbridge_core::progress::my_courses;
use skillbridge_core::progression::{can_graduate, lesson_states};

fn topic_lessons(topic: &str, count: u32) -> Vec<Lesson> {
    (0..count)
        .map(|i| Lesson {
            id: format!("{topic}-{i}"),
            title: format!("Lesson {i}"),
            xp: 10,
            difficulty: match i * 3 / count {
                0 => Difficulty::Easy,
                1 => Difficulty::Medium,
                _ => Difficulty::Hard,
            },
            order: count - i,
            topic_id: Some(topic.to_string()),
            content: vec![],
            assessment: None,
        })
        .collect()
}

fn bench_unlocking(c: &mut Criterion) {
    let mut group = c.benchmark_group("unlocking");

    let small = topic_lessons("small", 9);
    let large = topic_lessons("large", 300);
    let half_done: BTreeSet<String> = large.iter().take(150).map(|l| l.id.clone()).collect();
    let all_done: BTreeSet<String> = large.iter().map(|l| l.id.clone()).collect();

    group.bench_function("states_small", |b| {
        b.iter(|| lesson_states(black_box(&small), black_box(&BTreeSet::new())))
    });

    group.bench_function("states_large_half_done", |b| {
        b.iter(|| lesson_states(black_box(&large), black_box(&half_done)))
    });

    group.bench_function("graduate_large", |b| {
        b.iter(|| can_graduate(black_box(&large), black_box(&all_done)))
    });

    group.finish();
}

fn bench_progress(c: &mut Criterion) {
    let entries: Vec<(Topic, Vec<Lesson>)> = (0..20)
        .map(|t| {
            let id = format!("topic-{t}");
            let lessons = topic_lessons(&id, 30);
            (
                Topic {
                    id: id.clone(),
                    name: id,
                    description: String::new(),
                },
                lessons,
            )
        })
        .collect();
    let completed: BTreeSet<String> = entries
        .iter()
        .flat_map(|(_, lessons)| lessons.iter().step_by(2).map(|l| l.id.clone()))
        .collect();

    c.bench_function("my_courses_20_topics", |b| {
        b.iter(|| my_courses(black_box(&entries), black_box(&completed)))
    });
}

fn bench_local_grading(c: &mut Criterion) {
    let payload = QuizPayload {
        quiz: MicroQuiz {
            id: None,
            questions: (0..50)
                .map(|i| MicroQuestion {
                    id: format!("q{i}"),
                    question_text: String::new(),
                    options: vec!["a".into(), "b".into(), "c".into()],
                    answer_index: i % 3,
                    xp: None,
                })
                .collect(),
        },
        answers: (0..50)
            .map(|i| QuizAnswer {
                question_id: format!("q{i}"),
                selected_index: (i + i / 7) % 3,
            })
            .collect(),
    };

    c.bench_function("grade_locally_50", |b| {
        b.iter(|| grade_locally(black_box(&payload)))
    });
}

criterion_group!(benches, bench_unlocking, bench_progress, bench_local_grading);
criterion_main!(benches);
