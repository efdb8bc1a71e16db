//! Pre-flight validation of roadmap and test documents.
//!
//! These checks catch the data-quality problems grading and mapping
//! otherwise only log mid-flight: a warning here is never fatal, it
//! flags a document that will grade or map in a degraded way.

use crate::grading::option_letter;
use crate::model::{parse_month_key, Roadmap, WeeklyTest};
use crate::roadmap::{split_skill_focus, WEEKS_PER_MONTH};

/// A warning from document validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The month key or question number the warning applies to, if any.
    pub context: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a roadmap document for common issues.
pub fn validate_roadmap(roadmap: &Roadmap) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if roadmap.months.is_empty() {
        warnings.push(ValidationWarning {
            context: None,
            message: "roadmap has no months".into(),
        });
    }

    for (key, plan) in &roadmap.months {
        // Check for month keys the mapper would skip
        if parse_month_key(key).is_none() {
            warnings.push(ValidationWarning {
                context: Some(key.clone()),
                message: format!("month key {key:?} is not recognized and will be skipped"),
            });
        }

        // Check for months that cannot yield any mapping
        let skills = split_skill_focus(&plan.skill_focus);
        if skills.is_empty() {
            warnings.push(ValidationWarning {
                context: Some(key.clone()),
                message: "skill focus names no skills".into(),
            });
        }
        if plan.weekly_plan.is_empty() {
            warnings.push(ValidationWarning {
                context: Some(key.clone()),
                message: "weekly plan is empty".into(),
            });
        }

        // Check for focus skills no week text mentions (fallback applies)
        if !plan.weekly_plan.is_empty() {
            let lowered: Vec<String> = plan
                .weekly_plan
                .iter()
                .map(|text| text.to_lowercase())
                .collect();
            for skill in &skills {
                let skill_lower = skill.to_lowercase();
                if !lowered.iter().any(|text| text.contains(&skill_lower)) {
                    warnings.push(ValidationWarning {
                        context: Some(key.clone()),
                        message: format!("skill {skill:?} is not mentioned in any week text"),
                    });
                }
            }
        }
    }

    warnings
}

/// Validate a weekly test document for common issues.
pub fn validate_weekly_test(test: &WeeklyTest) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if test.week == 0 || test.week > WEEKS_PER_MONTH {
        warnings.push(ValidationWarning {
            context: None,
            message: format!("week {} is outside 1..={WEEKS_PER_MONTH}", test.week),
        });
    }
    if test.questions.is_empty() {
        warnings.push(ValidationWarning {
            context: None,
            message: "test has no questions".into(),
        });
    }

    for (i, question) in test.questions.iter().enumerate() {
        let context = Some(format!("question {}", i + 1));

        if question.topic.trim().is_empty() {
            warnings.push(ValidationWarning {
                context: context.clone(),
                message: "topic is empty".into(),
            });
        }
        if question.options.is_empty() {
            warnings.push(ValidationWarning {
                context: context.clone(),
                message: "question has no options".into(),
            });
        }
        if question.marks <= 0.0 {
            warnings.push(ValidationWarning {
                context: context.clone(),
                message: format!("marks is {} (must be positive)", question.marks),
            });
        }

        // Check that a letter key actually names one of the options
        if let Some(letter) = option_letter(&question.correct_answer) {
            let index = (letter as u8).wrapping_sub(b'A') as usize;
            if !question.options.is_empty() && index >= question.options.len() {
                warnings.push(ValidationWarning {
                    context: context.clone(),
                    message: format!(
                        "correct-answer letter {letter} points past the {} option(s)",
                        question.options.len()
                    ),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MonthPlan, Question};

    #[test]
    fn clean_roadmap_has_no_warnings() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert(
            "month_1".into(),
            MonthPlan {
                skill_focus: "Python, SQL".into(),
                weekly_plan: vec!["Week 1: Python".into(), "Week 2: SQL".into()],
            },
        );
        assert!(validate_roadmap(&roadmap).is_empty());
    }

    #[test]
    fn roadmap_problems_each_warn() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert(
            "semester_1".into(),
            MonthPlan {
                skill_focus: " , ".into(),
                weekly_plan: vec![],
            },
        );
        let warnings = validate_roadmap(&roadmap);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(warnings.len(), 3, "{messages:?}");
        assert!(messages.iter().any(|m| m.contains("not recognized")));
        assert!(messages.iter().any(|m| m.contains("names no skills")));
        assert!(messages.iter().any(|m| m.contains("weekly plan is empty")));
    }

    #[test]
    fn unmentioned_focus_skill_warns() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert(
            "month_1".into(),
            MonthPlan {
                skill_focus: "Python, Statistics".into(),
                weekly_plan: vec!["Week 1: Python drills".into()],
            },
        );
        let warnings = validate_roadmap(&roadmap);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("\"Statistics\""));
        assert_eq!(warnings[0].context.as_deref(), Some("month_1"));
    }

    #[test]
    fn empty_roadmap_warns() {
        let warnings = validate_roadmap(&Roadmap::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no months"));
    }

    fn test_question(topic: &str, correct: &str, options: &[&str], marks: f64) -> Question {
        Question {
            question: "placeholder".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            topic: topic.into(),
            correct_answer: correct.into(),
            marks,
        }
    }

    #[test]
    fn clean_test_has_no_warnings() {
        let test = WeeklyTest {
            month: 1,
            week: 2,
            questions: vec![test_question("SQL", "A", &["A) WHERE", "B) LIMIT"], 1.0)],
        };
        assert!(validate_weekly_test(&test).is_empty());
    }

    #[test]
    fn test_problems_each_warn() {
        let test = WeeklyTest {
            month: 1,
            week: 7,
            questions: vec![
                test_question("", "A", &["A) yes"], 1.0),
                test_question("SQL", "D", &["A) one", "B) two"], 0.0),
                test_question("SQL", "text answer", &[], 1.0),
            ],
        };
        let warnings = validate_weekly_test(&test);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("outside 1..=4")));
        assert!(messages.iter().any(|m| m.contains("topic is empty")));
        assert!(messages.iter().any(|m| m.contains("points past the 2 option(s)")));
        assert!(messages.iter().any(|m| m.contains("must be positive")));
        assert!(messages.iter().any(|m| m.contains("no options")));
        assert_eq!(warnings.len(), 5, "{messages:?}");
    }

    #[test]
    fn empty_test_warns() {
        let test = WeeklyTest {
            month: 1,
            week: 1,
            questions: vec![],
        };
        let warnings = validate_weekly_test(&test);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no questions"));
    }
}
