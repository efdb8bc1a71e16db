//! Central rating engine orchestrator.
//!
//! Wires the store, the matcher, and the pure scoring functions into the
//! three caller-facing operations: mapping generation, test submission,
//! and rating computation. Every read tolerates legacy identifier
//! variants; every write uses the canonical key.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::grading;
use crate::identity;
use crate::matcher::{atomic_skills, MatcherConfig, SkillMatcher};
use crate::model::{
    RatingEvidence, SkillRating, SkillWeekMapping, WeeklyTestResult,
};
use crate::performance;
use crate::rating;
use crate::roadmap::{self, FallbackWeek, WEEKS_PER_MONTH};
use crate::traits::{Embedder, ProgressStore};

/// Configuration for the rating engine.
///
/// Loaded from the `[engine]` section of the config file; every field
/// has a default so a missing section means default behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum cosine similarity for an accepted skill-topic match.
    pub similarity_threshold: f32,
    /// Budget for a single embedding call, in seconds.
    pub embed_timeout_secs: u64,
    /// Policy for focus skills no week text mentions.
    pub fallback_week: FallbackWeek,
    /// Country-code prefix tried when reading legacy records.
    pub country_code: String,
    /// Soft deadline for one rating request, in seconds. `None` means
    /// unbounded; when exceeded, remaining skills are skipped and the
    /// partial response is returned.
    pub rating_budget_secs: Option<u64>,
    /// Label vectors kept in the matcher's cache.
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            embed_timeout_secs: 10,
            fallback_week: FallbackWeek::default(),
            country_code: "91".to_string(),
            rating_budget_secs: None,
            cache_capacity: 1024,
        }
    }
}

impl EngineConfig {
    fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            similarity_threshold: self.similarity_threshold,
            embed_timeout: Duration::from_secs(self.embed_timeout_secs),
            cache_capacity: self.cache_capacity,
        }
    }
}

/// The central rating engine.
pub struct RatingEngine {
    store: Arc<dyn ProgressStore>,
    matcher: SkillMatcher,
    config: EngineConfig,
}

impl RatingEngine {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        embedder: Arc<dyn Embedder>,
        config: EngineConfig,
    ) -> Self {
        let matcher = SkillMatcher::new(embedder, config.matcher_config());
        Self {
            store,
            matcher,
            config,
        }
    }

    /// Regenerate and persist the user's skill-week mapping from their
    /// roadmap. Returns an empty mapping, and writes nothing, when no
    /// roadmap exists.
    #[instrument(skip(self), fields(user = %identity::canonical_key(user)))]
    pub async fn generate_skill_mappings(&self, user: &str) -> Result<SkillWeekMapping> {
        let canonical = identity::canonical_key(user);
        let Some(roadmap_doc) = self.find_roadmap(user).await? else {
            info!("no roadmap found, returning empty mapping");
            return Ok(SkillWeekMapping::default());
        };

        let mapping = roadmap::map_roadmap(&roadmap_doc, self.config.fallback_week);
        self.store
            .upsert_skill_week_mapping(&canonical, &mapping)
            .await
            .map_err(|e| Error::store(e.to_string()))?;

        info!(
            months = mapping.months.len(),
            skills = mapping.months.values().map(|m| m.len()).sum::<usize>(),
            "skill-week mapping regenerated"
        );
        Ok(mapping)
    }

    /// Grade a submission against the stored test paper and persist the
    /// result, replacing any earlier result for the same (month, week).
    ///
    /// `answers` align with the paper's questions by position; missing
    /// trailing answers grade as unanswered.
    #[instrument(skip(self, answers), fields(user = %identity::canonical_key(user), month, week))]
    pub async fn submit_weekly_test(
        &self,
        user: &str,
        month: u32,
        week: u32,
        answers: &[Option<String>],
    ) -> Result<WeeklyTestResult> {
        if !(1..=WEEKS_PER_MONTH).contains(&week) {
            return Err(Error::invalid_record(format!(
                "week {week} outside 1..={WEEKS_PER_MONTH}"
            )));
        }
        let canonical = identity::canonical_key(user);
        let paper = self
            .find_weekly_test(user, month, week)
            .await?
            .ok_or_else(|| {
                Error::missing("weekly test", format!("{canonical} month {month} week {week}"))
            })?;

        if let Some(bad) = paper.questions.iter().find(|q| q.marks < 0.0) {
            return Err(Error::invalid_record(format!(
                "negative marks on question for topic '{}'",
                bad.topic
            )));
        }
        if answers.len() > paper.questions.len() {
            warn!(
                answers = answers.len(),
                questions = paper.questions.len(),
                "more answers than questions, ignoring the extras"
            );
        }

        let graded: Vec<_> = paper
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let submitted = answers.get(i).and_then(|a| a.as_deref());
                grading::grade(question, submitted)
            })
            .collect();

        let result = performance::build_result(month, week, &graded);
        self.store
            .upsert_weekly_result(&canonical, &result)
            .await
            .map_err(|e| Error::store(e.to_string()))?;

        info!(
            correct = result.correct,
            total = result.total,
            overall = result.overall_percentage,
            topics = result.skill_performance.len(),
            "weekly test graded"
        );
        Ok(result)
    }

    /// Compute the star rating for every atomic skill in the user's
    /// resume profile.
    ///
    /// Missing profile, mapping, or results are neutral: affected skills
    /// come back as `NotYetRated` and an absent profile yields an empty
    /// map. Only structurally invalid stored results abort the request.
    #[instrument(skip(self), fields(user = %identity::canonical_key(user)))]
    pub async fn get_skill_ratings(&self, user: &str) -> Result<BTreeMap<String, SkillRating>> {
        let Some(profile) = self.find_resume(user).await? else {
            info!("no resume profile, returning empty rating set");
            return Ok(BTreeMap::new());
        };
        let skills = atomic_skills(&profile.skills);
        if skills.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mapping = self
            .find_mapping(user)
            .await?
            .unwrap_or_default();
        let results = self.collect_results(user).await?;
        let by_week: BTreeMap<(u32, u32), &WeeklyTestResult> = results
            .iter()
            .map(|r| ((r.month, r.week), r))
            .collect();

        let deadline = self
            .config
            .rating_budget_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let mut ratings = BTreeMap::new();
        for (index, skill) in skills.iter().enumerate() {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(
                        skipped = skills.len() - index,
                        "rating budget exceeded, returning partial results"
                    );
                    break;
                }
            }
            let rating = self.rate_skill(skill, &mapping, &by_week).await;
            ratings.insert(skill.clone(), rating);
        }

        info!(
            rated = ratings.values().filter(|r| r.is_rated()).count(),
            total = ratings.len(),
            "skill ratings computed"
        );
        Ok(ratings)
    }

    /// Skills whose mapped weeks for `month` finish at `week`: the
    /// completion signal consumed by the external resume-append process.
    #[instrument(skip(self), fields(user = %identity::canonical_key(user), month, week))]
    pub async fn completed_skills(&self, user: &str, month: u32, week: u32) -> Result<Vec<String>> {
        let Some(mapping) = self.find_mapping(user).await? else {
            return Ok(Vec::new());
        };
        let Some(skills) = mapping.months.get(&month) else {
            return Ok(Vec::new());
        };
        let finished = skills
            .iter()
            .filter(|(_, weeks)| weeks.iter().max() == Some(&week))
            .map(|(skill, _)| skill.as_str());
        Ok(atomic_skills(finished))
    }

    /// Rate one skill from its mapped weeks' performance breakdowns.
    ///
    /// A week contributes only through an accepted topic match; its
    /// overall percentage is never used in place of one.
    async fn rate_skill(
        &self,
        skill: &str,
        mapping: &SkillWeekMapping,
        by_week: &BTreeMap<(u32, u32), &WeeklyTestResult>,
    ) -> SkillRating {
        let mut evidence = Vec::new();
        for (month, week) in roadmap::weeks_for_skill(mapping, skill) {
            let Some(result) = by_week.get(&(month, week)) else {
                debug!(skill, month, week, "no test result for mapped week");
                continue;
            };
            let topics: Vec<String> = result.skill_performance.keys().cloned().collect();
            if topics.is_empty() {
                continue;
            }
            if let Some(matched) = self.matcher.accepted_match(skill, &topics).await {
                let percentage = result
                    .skill_performance
                    .get(&matched.topic)
                    .map(|ts| ts.percentage)
                    .unwrap_or(0.0);
                evidence.push(RatingEvidence {
                    month,
                    week,
                    topic: matched.topic,
                    similarity: matched.similarity,
                    percentage,
                });
            }
        }
        rating::build_rating(evidence)
    }

    async fn find_roadmap(&self, user: &str) -> Result<Option<crate::model::Roadmap>> {
        for key in self.keys_for(user) {
            match self.store.roadmap(&key).await {
                Ok(Some(doc)) => {
                    self.note_legacy_hit(user, &key, "roadmap");
                    return Ok(Some(doc));
                }
                Ok(None) => continue,
                Err(e) => return Err(Error::store(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn find_mapping(&self, user: &str) -> Result<Option<SkillWeekMapping>> {
        for key in self.keys_for(user) {
            match self.store.skill_week_mapping(&key).await {
                Ok(Some(doc)) => {
                    self.note_legacy_hit(user, &key, "skill-week mapping");
                    return Ok(Some(doc));
                }
                Ok(None) => continue,
                Err(e) => return Err(Error::store(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn find_weekly_test(
        &self,
        user: &str,
        month: u32,
        week: u32,
    ) -> Result<Option<crate::model::WeeklyTest>> {
        for key in self.keys_for(user) {
            match self.store.weekly_test(&key, month, week).await {
                Ok(Some(doc)) => {
                    self.note_legacy_hit(user, &key, "weekly test");
                    return Ok(Some(doc));
                }
                Ok(None) => continue,
                Err(e) => return Err(Error::store(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn find_resume(&self, user: &str) -> Result<Option<crate::model::ResumeProfile>> {
        for key in self.keys_for(user) {
            match self.store.resume_skills(&key).await {
                Ok(Some(doc)) => {
                    self.note_legacy_hit(user, &key, "resume profile");
                    return Ok(Some(doc));
                }
                Ok(None) => continue,
                Err(e) => return Err(Error::store(e.to_string())),
            }
        }
        Ok(None)
    }

    /// Union of results across all identifier variants, first variant
    /// winning per (month, week); structurally invalid records abort.
    async fn collect_results(&self, user: &str) -> Result<Vec<WeeklyTestResult>> {
        let mut seen = BTreeMap::new();
        for key in self.keys_for(user) {
            let results = self
                .store
                .weekly_results(&key)
                .await
                .map_err(|e| Error::store(e.to_string()))?;
            for result in results {
                performance::validate_result(&result)?;
                seen.entry((result.month, result.week)).or_insert(result);
            }
        }
        Ok(seen.into_values().collect())
    }

    fn keys_for(&self, user: &str) -> Vec<String> {
        identity::lookup_keys(user, &self.config.country_code)
    }

    fn note_legacy_hit(&self, user: &str, key: &str, entity: &str) {
        if key != identity::canonical_key(user) {
            warn!(key, entity, "record found under legacy identifier variant");
        }
    }
}
