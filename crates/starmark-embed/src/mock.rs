//! Mock embedder for testing and offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use starmark_core::traits::Embedder;

const DEFAULT_DIMENSIONS: usize = 64;

/// A deterministic embedder that needs no model files or network.
///
/// Texts are lowercased, tokenized on non-alphanumeric boundaries, and
/// each token is hashed into one vector component. Identical texts get
/// identical vectors, texts sharing tokens score high cosine similarity,
/// and unrelated texts score near zero. Exact-text overrides can be
/// scripted for tests that need precise similarities.
pub struct MockEmbedder {
    /// Map of exact text → scripted vector.
    vectors: HashMap<String, Vec<f32>>,
    dimensions: usize,
    /// Number of embed calls made.
    call_count: AtomicU32,
    /// Last text embedded.
    last_input: Mutex<Option<String>>,
}

impl MockEmbedder {
    /// Create a mock embedder with the given vector width.
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dimensions: dimensions.max(1),
            call_count: AtomicU32::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Create a mock embedder that returns scripted vectors for exact
    /// texts and falls back to hashed tokens for everything else.
    pub fn with_vectors(vectors: HashMap<String, Vec<f32>>) -> Self {
        Self {
            vectors,
            dimensions: DEFAULT_DIMENSIONS,
            call_count: AtomicU32::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Get the number of embed calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last text embedded.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }

    fn token_vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

/// FNV-1a, enough to spread tokens across buckets deterministically.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_input.lock().unwrap() = Some(text.to_string());

        if let Some(vector) = self.vectors.get(text) {
            return Ok(vector.clone());
        }
        Ok(self.token_vector(text))
    }
}
