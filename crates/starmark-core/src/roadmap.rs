//! Roadmap parsing: deriving which week(s) teach each skill.
//!
//! A month's plan carries a comma-separated "skill focus" string and up
//! to four week text blocks. Week attribution is a substring scan, not
//! anything clever: roadmap text is LLM-generated prose and the skill
//! labels inside it are only ever mentioned verbatim.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{MonthPlan, MonthSkillMap, Roadmap, SkillWeekMapping};

/// Weeks a curriculum month spans when the plan itself is empty.
pub const WEEKS_PER_MONTH: u32 = 4;

/// Policy for focus skills that no week text mentions.
///
/// Curriculum summaries often omit skills already implied by the focus
/// line. Attributing them to the month's final week keeps every named
/// skill reachable by completion tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackWeek {
    /// Attribute the skill to the last week of the month.
    #[default]
    #[serde(rename = "last")]
    LastWeek,
    /// Leave the skill out of the mapping.
    #[serde(rename = "none")]
    None,
}

/// Split a skill-focus string into trimmed, non-empty labels.
pub fn split_skill_focus(focus: &str) -> Vec<String> {
    focus
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First `Week N` number mentioned in a plan text block, if any.
pub fn week_number_in(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find("week") {
        let mut i = search_from + pos + 4;
        let mut saw_space = false;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            saw_space = true;
            i += 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if saw_space && i > digits_start {
            if let Ok(n) = lower[digits_start..i].parse::<u32>() {
                return Some(n);
            }
        }
        search_from += pos + 4;
    }
    None
}

/// Map one month's plan to `{skill -> weeks taught}`.
///
/// A skill maps to every week whose text mentions it (case-insensitive
/// substring); week numbers come from a `Week N` marker in the text,
/// falling back to the block's position. Skills mentioned nowhere follow
/// the `fallback` policy.
pub fn map_month(plan: &MonthPlan, fallback: FallbackWeek) -> MonthSkillMap {
    let week_numbers: Vec<u32> = plan
        .weekly_plan
        .iter()
        .enumerate()
        .map(|(i, text)| week_number_in(text).unwrap_or(i as u32 + 1))
        .collect();
    let last_week = week_numbers.iter().max().copied().unwrap_or(WEEKS_PER_MONTH);

    let lowered_plan: Vec<String> = plan
        .weekly_plan
        .iter()
        .map(|text| text.to_lowercase())
        .collect();

    let mut mapping = MonthSkillMap::new();
    for skill in split_skill_focus(&plan.skill_focus) {
        let skill_lower = skill.to_lowercase();
        let mut weeks: Vec<u32> = lowered_plan
            .iter()
            .zip(&week_numbers)
            .filter(|(text, _)| text.contains(&skill_lower))
            .map(|(_, week)| *week)
            .collect();
        weeks.sort_unstable();
        weeks.dedup();

        if weeks.is_empty() {
            match fallback {
                FallbackWeek::LastWeek => {
                    debug!(skill = %skill, week = last_week, "skill not mentioned in any week, using last week");
                    weeks.push(last_week);
                }
                FallbackWeek::None => {
                    debug!(skill = %skill, "skill not mentioned in any week, leaving unmapped");
                    continue;
                }
            }
        }
        mapping.insert(skill, weeks);
    }
    mapping
}

/// Map every month of a roadmap. Months that yield no skills are omitted.
pub fn map_roadmap(roadmap: &Roadmap, fallback: FallbackWeek) -> SkillWeekMapping {
    let mut months = std::collections::BTreeMap::new();
    for (month, plan) in roadmap.month_plans() {
        let mapping = map_month(plan, fallback);
        if !mapping.is_empty() {
            months.insert(month, mapping);
        }
    }
    SkillWeekMapping { months }
}

/// The (month, week) pairs a skill is mapped to, across all months.
///
/// Mapping keys and queried labels come from different sources, so the
/// lookup cascades: exact key, case-insensitive key, then substring
/// containment in either direction. The first level that hits wins for
/// each month.
pub fn weeks_for_skill(mapping: &SkillWeekMapping, skill: &str) -> Vec<(u32, u32)> {
    let skill_lower = skill.to_lowercase();
    let mut pairs = Vec::new();
    for (month, skills) in &mapping.months {
        let weeks = skills.get(skill).or_else(|| {
            skills
                .iter()
                .find(|(key, _)| key.to_lowercase() == skill_lower)
                .map(|(_, weeks)| weeks)
        });
        let weeks = weeks.or_else(|| {
            skills
                .iter()
                .find(|(key, _)| {
                    let key_lower = key.to_lowercase();
                    key_lower.contains(&skill_lower) || skill_lower.contains(&key_lower)
                })
                .map(|(_, weeks)| weeks)
        });
        if let Some(weeks) = weeks {
            pairs.extend(weeks.iter().map(|w| (*month, *w)));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(focus: &str, weeks: &[&str]) -> MonthPlan {
        MonthPlan {
            skill_focus: focus.into(),
            weekly_plan: weeks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn week_number_parsing() {
        assert_eq!(week_number_in("Week 1: Python basics"), Some(1));
        assert_eq!(week_number_in("Revise in Week 3 and practice"), Some(3));
        assert_eq!(week_number_in("week   12: review"), Some(12));
        assert_eq!(week_number_in("Weekly drills"), None);
        assert_eq!(week_number_in("No marker here"), None);
        assert_eq!(week_number_in(""), None);
    }

    #[test]
    fn skill_maps_to_mentioning_week() {
        let plan = plan(
            "Python, SQL",
            &[
                "Week 1: Python syntax and functions",
                "Week 2: SQL joins and aggregation",
            ],
        );
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["Python"], vec![1]);
        assert_eq!(mapping["SQL"], vec![2]);
    }

    #[test]
    fn recurring_skill_maps_to_every_week() {
        let plan = plan(
            "Python",
            &[
                "Week 1: Python basics",
                "Week 2: SQL",
                "Week 3: advanced Python patterns",
            ],
        );
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["Python"], vec![1, 3]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let plan = plan("pandas", &["Week 1: Pandas DataFrames deep dive"]);
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["pandas"], vec![1]);
    }

    #[test]
    fn unmatched_skill_defaults_to_last_week() {
        let plan = plan(
            "Python, Statistics",
            &["Week 1: Python", "Week 2: SQL", "Week 3: review", "Week 4: project"],
        );
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["Statistics"], vec![4]);
    }

    #[test]
    fn unmatched_skill_dropped_under_none_policy() {
        let plan = plan("Python, Statistics", &["Week 1: Python"]);
        let mapping = map_month(&plan, FallbackWeek::None);
        assert!(mapping.contains_key("Python"));
        assert!(!mapping.contains_key("Statistics"));
    }

    #[test]
    fn last_week_follows_plan_markers() {
        // A two-entry plan whose markers stop at week 2: the fallback
        // goes to week 2, not an assumed week 4.
        let plan = plan("Mystery Skill", &["Week 1: intro", "Week 2: wrap up"]);
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["Mystery Skill"], vec![2]);
    }

    #[test]
    fn empty_plan_defaults_to_month_length() {
        let plan = plan("Python", &[]);
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["Python"], vec![WEEKS_PER_MONTH]);
    }

    #[test]
    fn unnumbered_entries_use_position() {
        let plan = plan("SQL", &["Python day", "SQL day"]);
        let mapping = map_month(&plan, FallbackWeek::LastWeek);
        assert_eq!(mapping["SQL"], vec![2]);
    }

    #[test]
    fn focus_splitting_drops_empties() {
        assert_eq!(
            split_skill_focus(" Python ,  SQL,, Pandas , "),
            vec!["Python", "SQL", "Pandas"]
        );
        assert!(split_skill_focus("").is_empty());
        assert!(split_skill_focus(" , ,").is_empty());
    }

    #[test]
    fn roadmap_mapping_skips_empty_months() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert("month_1".into(), plan("Python", &["Week 1: Python"]));
        roadmap.months.insert("month_2".into(), plan("", &["Week 1: nothing named"]));
        let mapping = map_roadmap(&roadmap, FallbackWeek::LastWeek);
        assert!(mapping.months.contains_key(&1));
        assert!(!mapping.months.contains_key(&2));
    }

    #[test]
    fn mapping_is_deterministic() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert(
            "Month 1".into(),
            plan("Python, SQL", &["Week 1: Python", "Week 2: SQL"]),
        );
        let first = map_roadmap(&roadmap, FallbackWeek::LastWeek);
        let second = map_roadmap(&roadmap, FallbackWeek::LastWeek);
        assert_eq!(first, second);
    }

    #[test]
    fn weeks_lookup_cascades() {
        let mut roadmap = Roadmap::default();
        roadmap.months.insert(
            "month_1".into(),
            plan(
                "Machine Learning Models & scikit-learn, SQL",
                &["Week 2: machine learning models & scikit-learn practice", "Week 3: SQL"],
            ),
        );
        let mapping = map_roadmap(&roadmap, FallbackWeek::LastWeek);

        // Exact.
        assert_eq!(weeks_for_skill(&mapping, "SQL"), vec![(1, 3)]);
        // Case-insensitive.
        assert_eq!(weeks_for_skill(&mapping, "sql"), vec![(1, 3)]);
        // Substring: the atomic part finds the compound mapping key.
        assert_eq!(
            weeks_for_skill(&mapping, "Machine Learning Models"),
            vec![(1, 2)]
        );
        // No relation at all.
        assert!(weeks_for_skill(&mapping, "Kubernetes").is_empty());
    }
}
