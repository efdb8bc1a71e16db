//! Core data model types for starmark.
//!
//! These are the record types the whole system exchanges: curriculum
//! roadmaps, weekly test papers and results, skill-week mappings, resume
//! profiles, and the derived skill ratings. Field names follow the
//! serialized documents produced upstream (camelCase where the documents
//! use it), with aliases for the legacy spellings still found in older
//! records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A single question inside a stored weekly test paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the learner.
    pub question: String,
    /// Ordered option strings. Letter answers index into this list (A = 0).
    #[serde(default)]
    pub options: Vec<String>,
    /// Topic (skill) label this question contributes to.
    #[serde(alias = "skill")]
    pub topic: String,
    /// Either a full option string or a single letter A-Z naming an option.
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    /// Marks awarded for a correct answer.
    #[serde(default = "default_marks")]
    pub marks: f64,
}

fn default_marks() -> f64 {
    1.0
}

/// A stored weekly test paper: the questions a submission is graded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTest {
    /// Month number within the curriculum (1-based).
    pub month: u32,
    /// Week number within the month (1..=4).
    pub week: u32,
    /// The questions, in submission order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// The grading outcome for one submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedAnswer {
    /// Topic label copied from the question.
    pub topic: String,
    /// Whether the submission matched the correct answer.
    pub is_correct: bool,
    /// Marks available for this question.
    pub marks: f64,
    /// Marks earned (equals `marks` when correct, 0 otherwise).
    pub marks_earned: f64,
}

/// Per-topic score breakdown inside a weekly test result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicScore {
    /// Marks earned across this topic's questions.
    pub score: f64,
    /// Marks available across this topic's questions.
    pub max_score: f64,
    /// Count of correctly answered questions.
    pub correct: u32,
    /// Count of questions in this topic.
    pub total: u32,
    /// `100 * score / max_score`, 0 when `max_score` is 0.
    pub percentage: f64,
}

/// The authoritative result of one (user, month, week) test submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTestResult {
    /// Month number within the curriculum (1-based).
    pub month: u32,
    /// Week number within the month (1..=4).
    pub week: u32,
    /// Marks earned over the whole test.
    pub score: f64,
    /// Marks available over the whole test.
    pub max_score: f64,
    /// Correctly answered questions over the whole test.
    pub correct: u32,
    /// Total questions in the test.
    pub total: u32,
    /// Score-weighted percentage over all questions, not a mean of topics.
    #[serde(alias = "scorePercentage")]
    pub overall_percentage: f64,
    /// Topic label -> per-topic breakdown.
    #[serde(default)]
    pub skill_performance: BTreeMap<String, TopicScore>,
    /// When the submission was graded.
    pub submitted_at: DateTime<Utc>,
}

/// One month's curriculum plan as stored in a roadmap document.
///
/// Legacy documents use prose keys ("Skill Focus", "Daily Plan (2
/// hours/day)"); both spellings deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthPlan {
    /// Comma-separated skill labels this month teaches.
    #[serde(rename = "skillFocus", alias = "Skill Focus", default)]
    pub skill_focus: String,
    /// Week-by-week text blocks, optionally prefixed with "Week N:".
    #[serde(rename = "dailyPlan", alias = "Daily Plan (2 hours/day)", default)]
    pub weekly_plan: Vec<String>,
}

/// A user's curriculum roadmap, keyed by month.
///
/// Month keys in stored documents vary: `"1"`, `"month_1"`, and
/// `"Month 1"` all occur. [`parse_month_key`] accepts all three.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roadmap {
    /// Raw month key -> plan. Use [`Roadmap::month_plans`] for parsed keys.
    #[serde(default)]
    pub months: BTreeMap<String, MonthPlan>,
}

impl Roadmap {
    /// Month plans with parsed month numbers, ascending. Unparseable keys
    /// are skipped.
    pub fn month_plans(&self) -> Vec<(u32, &MonthPlan)> {
        let mut plans: Vec<(u32, &MonthPlan)> = self
            .months
            .iter()
            .filter_map(|(key, plan)| parse_month_key(key).map(|m| (m, plan)))
            .collect();
        plans.sort_by_key(|(m, _)| *m);
        plans
    }
}

/// Parse a stored month key: `"3"`, `"month_3"`, or `"Month 3"`.
pub fn parse_month_key(key: &str) -> Option<u32> {
    let trimmed = key.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(n);
    }
    let lower = trimmed.to_lowercase();
    let rest = lower.strip_prefix("month")?;
    rest.trim_start_matches(['_', ' ']).parse::<u32>().ok()
}

/// Skill label -> weeks taught, for one month.
pub type MonthSkillMap = BTreeMap<String, Vec<u32>>;

/// A user's full skill-week mapping document across all months.
///
/// Serialized month keys use the `"month_N"` form; legacy week values
/// may be a bare integer instead of a list, and both deserialize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillWeekMapping {
    pub months: BTreeMap<u32, MonthSkillMap>,
}

impl SkillWeekMapping {
    /// All (month, skill, weeks) rows, months ascending.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &str, &[u32])> {
        self.months.iter().flat_map(|(month, skills)| {
            skills
                .iter()
                .map(move |(skill, weeks)| (*month, skill.as_str(), weeks.as_slice()))
        })
    }

    /// Weeks mapped for `skill` in `month`, if any.
    pub fn weeks_for(&self, month: u32, skill: &str) -> Option<&[u32]> {
        self.months
            .get(&month)
            .and_then(|skills| skills.get(skill))
            .map(|w| w.as_slice())
    }
}

impl Serialize for SkillWeekMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut outer = serializer.serialize_map(Some(1))?;
        let months: BTreeMap<String, &MonthSkillMap> = self
            .months
            .iter()
            .map(|(m, skills)| (format!("month_{m}"), skills))
            .collect();
        outer.serialize_entry("months", &months)?;
        outer.end()
    }
}

impl<'de> Deserialize<'de> for SkillWeekMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            months: BTreeMap<String, BTreeMap<String, OneOrMany>>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(u32),
            Many(Vec<u32>),
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut months = BTreeMap::new();
        for (key, skills) in raw.months {
            let month = parse_month_key(&key)
                .ok_or_else(|| de::Error::custom(format!("unrecognized month key: {key}")))?;
            let parsed: MonthSkillMap = skills
                .into_iter()
                .map(|(skill, weeks)| {
                    let weeks = match weeks {
                        OneOrMany::One(w) => vec![w],
                        OneOrMany::Many(ws) => ws,
                    };
                    (skill, weeks)
                })
                .collect();
            months.insert(month, parsed);
        }
        Ok(SkillWeekMapping { months })
    }
}

/// A user's resume skill list. Entries are expected to be atomic labels,
/// but compound `" & "` entries are tolerated and split downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub skills: Vec<String>,
}

/// One contributing (week, topic) observation behind a skill rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvidence {
    /// Month the contributing test belongs to.
    pub month: u32,
    /// Week the contributing test belongs to.
    pub week: u32,
    /// The matched topic label from that week's performance breakdown.
    pub topic: String,
    /// Cosine similarity between the skill label and the matched topic.
    pub similarity: f32,
    /// The matched topic's percentage for that week.
    pub percentage: f64,
}

/// A derived mastery rating for one skill.
///
/// `NotYetRated` means no week produced an accepted topic match; it is
/// deliberately distinct from a rated skill with 0 stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SkillRating {
    NotYetRated,
    #[serde(rename_all = "camelCase")]
    Rated {
        /// Arithmetic mean of the contributing percentages.
        average_percentage: f64,
        /// Discrete star count in 0..=3.
        stars: u8,
        /// The observations the average was computed from.
        evidence: Vec<RatingEvidence>,
    },
}

impl SkillRating {
    pub fn is_rated(&self) -> bool {
        matches!(self, SkillRating::Rated { .. })
    }

    /// Star count, if rated.
    pub fn stars(&self) -> Option<u8> {
        match self {
            SkillRating::Rated { stars, .. } => Some(*stars),
            SkillRating::NotYetRated => None,
        }
    }
}

impl fmt::Display for SkillRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillRating::NotYetRated => write!(f, "not yet rated"),
            SkillRating::Rated {
                average_percentage,
                stars,
                ..
            } => write!(f, "{stars} star(s) ({average_percentage:.1}%)"),
        }
    }
}
