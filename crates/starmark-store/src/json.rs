//! JSON directory store for durable progress records.
//!
//! Layout under the root:
//!
//! ```text
//! <root>/<key>/roadmap.json
//! <root>/<key>/mapping.json
//! <root>/<key>/resume.json
//! <root>/<key>/tests/m{M}w{W}.json
//! <root>/<key>/results/m{M}w{W}.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use starmark_core::model::{
    ResumeProfile, Roadmap, SkillWeekMapping, WeeklyTest, WeeklyTestResult,
};
use starmark_core::performance;
use starmark_core::traits::ProgressStore;

/// A `ProgressStore` over a directory of pretty-printed JSON files.
pub struct JsonStore {
    root: PathBuf,
}

/// A problem found by [`JsonStore::audit`].
#[derive(Debug)]
pub struct AuditIssue {
    /// File the problem was found in.
    pub path: PathBuf,
    /// What is wrong with it.
    pub problem: String,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory this store reads and writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Seed a roadmap under the given key.
    pub async fn put_roadmap(&self, key: &str, roadmap: &Roadmap) -> Result<()> {
        Self::write_json(&self.user_dir(key)?.join("roadmap.json"), roadmap).await
    }

    /// Seed a test paper under its (month, week).
    pub async fn put_weekly_test(&self, key: &str, test: &WeeklyTest) -> Result<()> {
        let path = self
            .user_dir(key)?
            .join("tests")
            .join(Self::week_file(test.month, test.week));
        Self::write_json(&path, test).await
    }

    /// Seed a resume profile under the given key.
    pub async fn put_resume(&self, key: &str, profile: &ResumeProfile) -> Result<()> {
        Self::write_json(&self.user_dir(key)?.join("resume.json"), profile).await
    }

    /// Check every record under the root and report what does not parse
    /// or fails validation, without stopping at the first problem.
    pub async fn audit(&self) -> Result<Vec<AuditIssue>> {
        let mut issues = Vec::new();
        let mut users = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(issues),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to list {}", self.root.display()))
            }
        };

        while let Some(user) = users.next_entry().await? {
            if !user.file_type().await?.is_dir() {
                continue;
            }
            let dir = user.path();

            Self::check::<Roadmap>(dir.join("roadmap.json"), &mut issues).await;
            Self::check::<SkillWeekMapping>(dir.join("mapping.json"), &mut issues).await;
            Self::check::<ResumeProfile>(dir.join("resume.json"), &mut issues).await;

            for path in Self::json_files(&dir.join("tests")).await? {
                Self::check::<WeeklyTest>(path, &mut issues).await;
            }
            for path in Self::json_files(&dir.join("results")).await? {
                let parsed = Self::check::<WeeklyTestResult>(path.clone(), &mut issues).await;
                if let Some(result) = parsed {
                    if let Err(e) = performance::validate_result(&result) {
                        issues.push(AuditIssue {
                            path,
                            problem: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(issues)
    }

    fn user_dir(&self, key: &str) -> Result<PathBuf> {
        // Keys are phone-like identifiers; anything path-shaped is a bug
        // upstream and must not escape the root.
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            bail!("invalid store key: {key:?}");
        }
        Ok(self.root.join(key))
    }

    fn week_file(month: u32, week: u32) -> String {
        format!("m{month}w{week}.json")
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(value).context("failed to serialize record")?;

        // Write-then-rename so readers never see half a record.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }

    /// Paths of every `.json` file in a directory, or empty when the
    /// directory does not exist.
    async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("failed to list {}", dir.display())),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn check<T: DeserializeOwned>(path: PathBuf, issues: &mut Vec<AuditIssue>) -> Option<T> {
        match Self::read_json::<T>(&path).await {
            Ok(value) => value,
            Err(e) => {
                issues.push(AuditIssue {
                    path,
                    problem: e.to_string(),
                });
                None
            }
        }
    }
}

#[async_trait]
impl ProgressStore for JsonStore {
    async fn roadmap(&self, key: &str) -> anyhow::Result<Option<Roadmap>> {
        Self::read_json(&self.user_dir(key)?.join("roadmap.json")).await
    }

    async fn skill_week_mapping(&self, key: &str) -> anyhow::Result<Option<SkillWeekMapping>> {
        Self::read_json(&self.user_dir(key)?.join("mapping.json")).await
    }

    async fn upsert_skill_week_mapping(
        &self,
        key: &str,
        mapping: &SkillWeekMapping,
    ) -> anyhow::Result<()> {
        Self::write_json(&self.user_dir(key)?.join("mapping.json"), mapping).await
    }

    async fn weekly_test(
        &self,
        key: &str,
        month: u32,
        week: u32,
    ) -> anyhow::Result<Option<WeeklyTest>> {
        let path = self
            .user_dir(key)?
            .join("tests")
            .join(Self::week_file(month, week));
        Self::read_json(&path).await
    }

    async fn weekly_results(&self, key: &str) -> anyhow::Result<Vec<WeeklyTestResult>> {
        let dir = self.user_dir(key)?.join("results");
        let mut results = Vec::new();
        for path in Self::json_files(&dir).await? {
            if let Some(result) = Self::read_json::<WeeklyTestResult>(&path).await? {
                results.push(result);
            }
        }
        // File names sort lexically (m10 before m2), so order by content.
        results.sort_by_key(|r| (r.month, r.week));
        Ok(results)
    }

    async fn upsert_weekly_result(
        &self,
        key: &str,
        result: &WeeklyTestResult,
    ) -> anyhow::Result<()> {
        let path = self
            .user_dir(key)?
            .join("results")
            .join(Self::week_file(result.month, result.week));
        Self::write_json(&path, result).await
    }

    async fn resume_skills(&self, key: &str) -> anyhow::Result<Option<ResumeProfile>> {
        Self::read_json(&self.user_dir(key)?.join("resume.json")).await
    }
}
