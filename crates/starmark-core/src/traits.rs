//! Core trait definitions for embedding backends and progress stores.
//!
//! These async traits are implemented by the `starmark-embed` and
//! `starmark-store` crates respectively.

use async_trait::async_trait;

use crate::model::{ResumeProfile, Roadmap, SkillWeekMapping, WeeklyTest, WeeklyTestResult};

// ---------------------------------------------------------------------------
// Embedder trait
// ---------------------------------------------------------------------------

/// Trait for sentence-embedding backends.
///
/// Implementations are expensive to construct (model load, HTTP client
/// setup) and are shared process-wide behind an `Arc`; inference is
/// read-only and safe to call concurrently.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the underlying model (e.g. "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// Dimensionality of the vectors this backend produces.
    fn dimensions(&self) -> usize;

    /// Embed a single text into a dense vector.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed a batch of texts. The default implementation loops
    /// [`Embedder::embed`]; backends with native batching override it.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs rather
/// than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }
    dot / (magnitude_a * magnitude_b)
}

// ---------------------------------------------------------------------------
// Progress store trait
// ---------------------------------------------------------------------------

/// Trait for the per-user persistence the engine reads and writes.
///
/// Methods take a single already-normalized key; the engine handles
/// legacy-variant fallbacks on top of this contract. Upserts replace the
/// record at their natural key, so the last write wins and no duplicates
/// accumulate.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// The user's curriculum roadmap, if one has been generated.
    async fn roadmap(&self, key: &str) -> anyhow::Result<Option<Roadmap>>;

    /// The user's skill-week mapping document.
    async fn skill_week_mapping(&self, key: &str) -> anyhow::Result<Option<SkillWeekMapping>>;

    /// Replace the user's whole skill-week mapping document.
    async fn upsert_skill_week_mapping(
        &self,
        key: &str,
        mapping: &SkillWeekMapping,
    ) -> anyhow::Result<()>;

    /// The stored test paper for (month, week), if one exists.
    async fn weekly_test(&self, key: &str, month: u32, week: u32)
        -> anyhow::Result<Option<WeeklyTest>>;

    /// Every weekly test result recorded under this key.
    async fn weekly_results(&self, key: &str) -> anyhow::Result<Vec<WeeklyTestResult>>;

    /// Replace the result for the record's (month, week).
    async fn upsert_weekly_result(
        &self,
        key: &str,
        result: &WeeklyTestResult,
    ) -> anyhow::Result<()>;

    /// The user's resume skill list, if a profile exists.
    async fn resume_skills(&self, key: &str) -> anyhow::Result<Option<ResumeProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![0.5, 0.3, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_guards_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
