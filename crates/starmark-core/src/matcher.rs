//! Semantic matching of resume skill labels to test topic labels.
//!
//! Resume skills and quiz topics are written by different processes with
//! no shared vocabulary ("Machine Learning Models" vs "90 mins build and
//! compare 2-3 models on a small dataset"), so candidates are scored by
//! cosine similarity over sentence embeddings instead of string
//! comparison. Label vectors are cached; a miss costs one bounded call
//! into the shared embedding backend, and any backend failure degrades
//! to "no match" so one bad call never poisons a whole rating response.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::traits::{cosine_similarity, Embedder};

/// Separator joining the parts of a compound skill label.
pub const COMPOUND_SEPARATOR: &str = " & ";

/// Tuning for [`SkillMatcher`].
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum cosine similarity for an accepted match.
    pub similarity_threshold: f32,
    /// Budget for one embedding call.
    pub embed_timeout: Duration,
    /// Label vectors kept in the LRU cache.
    pub cache_capacity: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            embed_timeout: Duration::from_secs(10),
            cache_capacity: 1024,
        }
    }
}

/// A candidate topic together with its similarity to the queried skill.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMatch {
    pub topic: String,
    pub similarity: f32,
}

/// Split a compound `" & "` label into trimmed atomic parts,
/// deduplicated case-insensitively with order preserved.
pub fn split_compound_label(label: &str) -> Vec<String> {
    dedupe_case_insensitive(
        label
            .split(COMPOUND_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    )
}

/// Flatten a list of possibly-compound labels into atomic skills,
/// deduplicated case-insensitively across the whole list.
pub fn atomic_skills<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe_case_insensitive(
        labels
            .into_iter()
            .flat_map(|label| split_compound_label(label.as_ref())),
    )
}

fn dedupe_case_insensitive(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let lower = item.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
            out.push(item);
        }
    }
    out
}

/// Embedding-based matcher over a shared backend.
///
/// Cheap to clone; clones share the embedder and the vector cache.
#[derive(Clone)]
pub struct SkillMatcher {
    embedder: Arc<dyn Embedder>,
    cache: Arc<Mutex<LruCache<String, Arc<Vec<f32>>>>>,
    config: MatcherConfig,
}

impl SkillMatcher {
    pub fn new(embedder: Arc<dyn Embedder>, config: MatcherConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            embedder,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            config,
        }
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.config.similarity_threshold
    }

    /// Best-scoring candidate for `skill`, regardless of threshold.
    ///
    /// Returns `None` when there are no candidates or the embedding
    /// backend fails or times out; failures are logged, not propagated.
    pub async fn best_match(&self, skill: &str, candidates: &[String]) -> Option<TopicMatch> {
        let skill = skill.trim();
        if skill.is_empty() || candidates.is_empty() {
            return None;
        }

        // Identical labels need no embedding call.
        if let Some(topic) = candidates
            .iter()
            .find(|c| c.trim().eq_ignore_ascii_case(skill))
        {
            return Some(TopicMatch {
                topic: topic.clone(),
                similarity: 1.0,
            });
        }

        let skill_vec = self.vector_for(skill).await?;
        let mut best: Option<TopicMatch> = None;
        for candidate in candidates {
            let candidate_vec = self.vector_for(candidate).await?;
            let similarity = cosine_similarity(&skill_vec, &candidate_vec);
            debug!(skill, topic = %candidate, similarity, "scored candidate");
            if best
                .as_ref()
                .is_none_or(|b| similarity.total_cmp(&b.similarity).is_gt())
            {
                best = Some(TopicMatch {
                    topic: candidate.clone(),
                    similarity,
                });
            }
        }
        best
    }

    /// Best candidate if it clears the similarity threshold.
    ///
    /// A below-threshold best match is excluded (and logged) rather than
    /// returned, so unrelated topics never contaminate a skill's score.
    pub async fn accepted_match(&self, skill: &str, candidates: &[String]) -> Option<TopicMatch> {
        let best = self.best_match(skill, candidates).await?;
        if best.similarity >= self.config.similarity_threshold {
            Some(best)
        } else {
            warn!(
                skill,
                topic = %best.topic,
                similarity = best.similarity,
                threshold = self.config.similarity_threshold,
                "best candidate below similarity threshold, excluding"
            );
            None
        }
    }

    /// Cached vector for a label, embedding on miss with a bounded call.
    async fn vector_for(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(vector) = cache.get(text) {
                return Some(Arc::clone(vector));
            }
        }

        let embedded =
            tokio::time::timeout(self.config.embed_timeout, self.embedder.embed(text)).await;
        let vector = match embedded {
            Ok(Ok(vector)) => vector,
            Ok(Err(err)) => {
                warn!(text, error = %err, "embedding failed, degrading to no match");
                return None;
            }
            Err(_) => {
                warn!(
                    text,
                    timeout_secs = self.config.embed_timeout.as_secs(),
                    "embedding timed out, degrading to no match"
                );
                return None;
            }
        };

        if vector.len() != self.embedder.dimensions() {
            warn!(
                text,
                got = vector.len(),
                expected = self.embedder.dimensions(),
                "embedding has unexpected dimensions, degrading to no match"
            );
            return None;
        }

        let vector = Arc::new(vector);
        self.cache
            .lock()
            .await
            .put(text.to_string(), Arc::clone(&vector));
        Some(vector)
    }
}
