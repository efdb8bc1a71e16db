//! Local embedding backend using fastembed.
//!
//! Models are downloaded on first use into the cache directory and
//! loaded from there on later runs. Only compiled with the `local`
//! feature since the ONNX runtime is a heavyweight build dependency.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::task;
use tracing::{debug, info};

use starmark_core::traits::Embedder;

use crate::error::EmbedError;

/// Model used when the config names none.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Embedder running a fastembed model in-process.
pub struct LocalEmbedder {
    /// fastembed models need `&mut` to embed, so the handle lives
    /// behind a mutex and every call goes through `spawn_blocking`.
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load a model by name. Downloads it on a cold cache, which can
    /// take a minute or two.
    pub async fn load(model_name: &str, cache_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let (embedding_model, dimensions) = model_to_enum(model_name)?;

        info!(model = model_name, dimensions, "loading local embedding model");

        let mut init_options = InitOptions::default();
        init_options.model_name = embedding_model;
        init_options.show_download_progress = false;
        if let Some(dir) = cache_dir {
            init_options.cache_dir = dir;
        }

        let model = task::spawn_blocking(move || TextEmbedding::try_new(init_options))
            .await
            .map_err(|e| EmbedError::ModelLoad(format!("task join error: {e}")))?
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    async fn embed_blocking(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), "embedding batch locally");

        let model = Arc::clone(&self.model);
        let vectors = task::spawn_blocking(move || {
            let mut guard = model.lock().map_err(|e| format!("mutex lock failed: {e}"))?;
            guard.embed(texts, None).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| EmbedError::Inference(format!("task join error: {e}")))?
        .map_err(EmbedError::Inference)?;

        Ok(vectors)
    }
}

/// Map a model name to fastembed's model enum and its vector width.
fn model_to_enum(model_name: &str) -> Result<(EmbeddingModel, usize), EmbedError> {
    match model_name {
        "all-MiniLM-L6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-MiniLM-L12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        "nomic-embed-text-v1.5" => Ok((EmbeddingModel::NomicEmbedTextV15, 768)),
        other => Err(EmbedError::ModelLoad(format!(
            "unsupported model '{other}', expected one of: all-MiniLM-L6-v2, \
             all-MiniLM-L12-v2, bge-small-en-v1.5, bge-base-en-v1.5, nomic-embed-text-v1.5"
        ))),
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.embed_blocking(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Inference("no embedding returned".to_string()).into())
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.embed_blocking(texts.to_vec()).await
    }
}
