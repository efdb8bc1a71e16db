//! Answer grading.
//!
//! Submitted answers and stored correct answers come from different UIs
//! and generations of the question generator, so both sides are pushed
//! through the same normalization before comparison. Correct answers are
//! either a bare option letter ("D") or full answer text; submissions are
//! usually the full labeled option ("D) Image compression").

use tracing::warn;

use crate::model::{GradedAnswer, Question};

/// Normalize answer text for comparison: strip `<...>` tag runs, collapse
/// whitespace, trim, lowercase.
///
/// An unterminated `<` is kept literally rather than swallowing the rest
/// of the string.
pub fn normalize_answer_text(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        stripped.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                stripped.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    stripped.push_str(rest);

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The option letter named by a correct answer, when the single-letter
/// rule applies.
pub fn option_letter(correct_answer: &str) -> Option<char> {
    let trimmed = correct_answer.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Grade one submitted answer against its question.
///
/// Empty or absent submissions are always incorrect; malformed correct
/// answers are a data-quality condition, logged and graded structurally.
pub fn grade(question: &Question, submitted: Option<&str>) -> GradedAnswer {
    let is_correct = match submitted {
        Some(answer) => matches_correct(question, answer),
        None => false,
    };
    GradedAnswer {
        topic: question.topic.clone(),
        is_correct,
        marks: question.marks,
        marks_earned: if is_correct { question.marks } else { 0.0 },
    }
}

fn matches_correct(question: &Question, submitted: &str) -> bool {
    let normalized_submitted = normalize_answer_text(submitted);
    if normalized_submitted.is_empty() {
        return false;
    }

    if let Some(letter) = option_letter(&question.correct_answer) {
        let index = (letter as u8 - b'A') as usize;
        if !question.options.is_empty() && index >= question.options.len() {
            warn!(
                topic = %question.topic,
                letter = %letter,
                options = question.options.len(),
                "correct-answer letter points past the option list"
            );
        }
        let lower = letter.to_ascii_lowercase();
        return normalized_submitted.starts_with(&format!("{lower})"))
            || normalized_submitted.starts_with(&format!("{lower} "));
    }

    let normalized_correct = normalize_answer_text(&question.correct_answer);
    if !question.options.is_empty()
        && !question
            .options
            .iter()
            .any(|opt| normalize_answer_text(opt) == normalized_correct)
    {
        warn!(
            topic = %question.topic,
            "correct-answer text not present among the options"
        );
    }
    normalized_submitted == normalized_correct
}
