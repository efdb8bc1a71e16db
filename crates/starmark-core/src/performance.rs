//! Per-topic performance aggregation for a graded weekly test.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::Error;
use crate::model::{GradedAnswer, TopicScore, WeeklyTestResult};

/// `100 * score / max_score`, defined as 0 when `max_score` is 0.
pub fn percentage_of(score: f64, max_score: f64) -> f64 {
    if max_score == 0.0 {
        0.0
    } else {
        100.0 * score / max_score
    }
}

/// Fold graded answers into the authoritative result record for one
/// (month, week) submission.
///
/// The overall percentage is score-weighted over every question, not an
/// average of the topic percentages; topics with more questions weigh
/// more by construction.
pub fn build_result(month: u32, week: u32, graded: &[GradedAnswer]) -> WeeklyTestResult {
    let mut topics: BTreeMap<String, TopicScore> = BTreeMap::new();
    let mut score = 0.0;
    let mut max_score = 0.0;
    let mut correct = 0;

    for answer in graded {
        let entry = topics.entry(answer.topic.clone()).or_default();
        entry.score += answer.marks_earned;
        entry.max_score += answer.marks;
        entry.total += 1;
        if answer.is_correct {
            entry.correct += 1;
            correct += 1;
        }
        score += answer.marks_earned;
        max_score += answer.marks;
    }

    for topic in topics.values_mut() {
        topic.percentage = percentage_of(topic.score, topic.max_score);
    }

    WeeklyTestResult {
        month,
        week,
        score,
        max_score,
        correct,
        total: graded.len() as u32,
        overall_percentage: percentage_of(score, max_score),
        skill_performance: topics,
        submitted_at: Utc::now(),
    }
}

/// Reject structurally invalid result records read from a store.
///
/// Negative scores cannot arise from grading and indicate a corrupted
/// document; unlike missing data this is fatal.
pub fn validate_result(result: &WeeklyTestResult) -> Result<(), Error> {
    if result.score < 0.0 || result.max_score < 0.0 {
        return Err(Error::invalid_record(format!(
            "negative overall score in month {} week {}",
            result.month, result.week
        )));
    }
    for (topic, ts) in &result.skill_performance {
        if ts.score < 0.0 || ts.max_score < 0.0 {
            return Err(Error::invalid_record(format!(
                "negative score for topic '{topic}' in month {} week {}",
                result.month, result.week
            )));
        }
    }
    Ok(())
}
