use criterion::{black_box, criterion_group, criterion_main, Criterion};

use starmark_core::grading::{grade, normalize_answer_text};
use starmark_core::model::Question;
use starmark_core::performance::build_result;

fn make_paper(questions: usize) -> Vec<Question> {
    (0..questions)
        .map(|i| Question {
            question: format!("Question number {i} about data handling"),
            options: vec![
                "A) First option with some detail".into(),
                "B) Second option with some detail".into(),
                "C) Third option with some detail".into(),
                "D) Fourth option with some detail".into(),
            ],
            topic: format!("topic {}", i % 5),
            correct_answer: ["A", "B", "C", "D"][i % 4].into(),
            marks: 1.0,
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_answer_text");

    group.bench_function("plain", |b| {
        b.iter(|| normalize_answer_text(black_box("D) Image compression")))
    });

    group.bench_function("html_heavy", |b| {
        b.iter(|| {
            normalize_answer_text(black_box(
                "<p><b>D)</b>  Image   compression <i>with wavelets</i></p>",
            ))
        })
    });

    group.finish();
}

fn bench_grade_paper(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_paper");

    for size in [10usize, 40] {
        let paper = make_paper(size);
        let answers: Vec<Option<String>> = paper
            .iter()
            .map(|_| Some("B) Second option with some detail".to_string()))
            .collect();

        group.bench_function(format!("{size}_questions"), |b| {
            b.iter(|| {
                let graded: Vec<_> = paper
                    .iter()
                    .zip(&answers)
                    .map(|(q, a)| grade(black_box(q), a.as_deref()))
                    .collect();
                build_result(1, 2, black_box(&graded))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_grade_paper);
criterion_main!(benches);
