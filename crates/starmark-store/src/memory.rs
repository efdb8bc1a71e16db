//! In-memory progress store for tests and demos.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use starmark_core::model::{
    ResumeProfile, Roadmap, SkillWeekMapping, WeeklyTest, WeeklyTestResult,
};
use starmark_core::traits::ProgressStore;

/// A `ProgressStore` holding everything in process memory.
///
/// Nothing survives the process; use [`crate::JsonStore`] for durable
/// records.
#[derive(Default)]
pub struct MemoryStore {
    roadmaps: RwLock<BTreeMap<String, Roadmap>>,
    mappings: RwLock<BTreeMap<String, SkillWeekMapping>>,
    tests: RwLock<BTreeMap<(String, u32, u32), WeeklyTest>>,
    results: RwLock<BTreeMap<(String, u32, u32), WeeklyTestResult>>,
    resumes: RwLock<BTreeMap<String, ResumeProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a roadmap under the given key.
    pub async fn put_roadmap(&self, key: &str, roadmap: Roadmap) {
        self.roadmaps.write().await.insert(key.to_string(), roadmap);
    }

    /// Seed a test paper under its (month, week).
    pub async fn put_weekly_test(&self, key: &str, test: WeeklyTest) {
        self.tests
            .write()
            .await
            .insert((key.to_string(), test.month, test.week), test);
    }

    /// Seed a resume profile under the given key.
    pub async fn put_resume(&self, key: &str, profile: ResumeProfile) {
        self.resumes.write().await.insert(key.to_string(), profile);
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn roadmap(&self, key: &str) -> anyhow::Result<Option<Roadmap>> {
        Ok(self.roadmaps.read().await.get(key).cloned())
    }

    async fn skill_week_mapping(&self, key: &str) -> anyhow::Result<Option<SkillWeekMapping>> {
        Ok(self.mappings.read().await.get(key).cloned())
    }

    async fn upsert_skill_week_mapping(
        &self,
        key: &str,
        mapping: &SkillWeekMapping,
    ) -> anyhow::Result<()> {
        self.mappings
            .write()
            .await
            .insert(key.to_string(), mapping.clone());
        Ok(())
    }

    async fn weekly_test(
        &self,
        key: &str,
        month: u32,
        week: u32,
    ) -> anyhow::Result<Option<WeeklyTest>> {
        Ok(self
            .tests
            .read()
            .await
            .get(&(key.to_string(), month, week))
            .cloned())
    }

    async fn weekly_results(&self, key: &str) -> anyhow::Result<Vec<WeeklyTestResult>> {
        // BTreeMap key order gives (month, week) order per user.
        Ok(self
            .results
            .read()
            .await
            .iter()
            .filter(|((k, _, _), _)| k == key)
            .map(|(_, result)| result.clone())
            .collect())
    }

    async fn upsert_weekly_result(
        &self,
        key: &str,
        result: &WeeklyTestResult,
    ) -> anyhow::Result<()> {
        self.results
            .write()
            .await
            .insert((key.to_string(), result.month, result.week), result.clone());
        Ok(())
    }

    async fn resume_skills(&self, key: &str) -> anyhow::Result<Option<ResumeProfile>> {
        Ok(self.resumes.read().await.get(key).cloned())
    }
}
