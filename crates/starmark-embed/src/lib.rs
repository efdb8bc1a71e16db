//! starmark-embed — Embedding backends for skill matching.
//!
//! Implements the `Embedder` trait over a deterministic mock, an
//! OpenAI-compatible HTTP API, and (behind the `local` feature)
//! fastembed models run in-process.

pub mod config;
pub mod error;
#[cfg(feature = "local")]
pub mod local;
pub mod mock;
pub mod remote;

pub use config::{
    create_embedder, load_config, load_config_from, EmbedderConfig, StarmarkConfig,
};
pub use error::EmbedError;
pub use mock::MockEmbedder;
pub use remote::RemoteEmbedder;
