//! Subcommand implementations.

pub mod init;
pub mod map;
pub mod rate;
pub mod submit;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use starmark_core::engine::RatingEngine;
use starmark_embed::config::{create_embedder, load_config_from};
use starmark_store::JsonStore;

/// Load config and wire the engine over the JSON store.
pub(crate) async fn build_engine(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> Result<RatingEngine> {
    let config = load_config_from(config_path)?;
    let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
    let store = Arc::new(JsonStore::new(data_dir));
    let embedder = create_embedder(&config.embedder).await?;
    Ok(RatingEngine::new(store, embedder, config.engine))
}
