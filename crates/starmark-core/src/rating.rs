//! Star rating aggregation.
//!
//! A skill's rating is the arithmetic mean of its matched per-week topic
//! percentages, banded into 0..=3 stars. A skill with no accepted match
//! anywhere is "not yet rated", which is a different statement than a
//! rated 0 stars: the first means no evidence, the second means evidence
//! of poor performance.

use crate::model::{RatingEvidence, SkillRating};

/// Band an average percentage into a star count.
pub fn stars_for(average: f64) -> u8 {
    if average >= 90.0 {
        3
    } else if average >= 70.0 {
        2
    } else if average >= 50.0 {
        1
    } else {
        0
    }
}

/// Aggregate the collected evidence for one skill into its rating.
///
/// The evidence rows carry matched topic percentages only; the overall
/// week percentage is never among them, so a skill's rating can never be
/// diluted by unrelated topics answered in the same week.
pub fn build_rating(evidence: Vec<RatingEvidence>) -> SkillRating {
    if evidence.is_empty() {
        return SkillRating::NotYetRated;
    }
    let sum: f64 = evidence.iter().map(|e| e.percentage).sum();
    let average = sum / evidence.len() as f64;
    SkillRating::Rated {
        average_percentage: average,
        stars: stars_for(average),
        evidence,
    }
}
