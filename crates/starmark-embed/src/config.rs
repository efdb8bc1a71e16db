//! Configuration loading and the embedder factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use starmark_core::engine::EngineConfig;
use starmark_core::traits::Embedder;

use crate::mock::MockEmbedder;
use crate::remote::RemoteEmbedder;

/// Configuration for the embedding backend.
///
/// The manual `Debug` impl masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum EmbedderConfig {
    Mock {
        #[serde(default = "default_mock_dimensions")]
        dimensions: usize,
    },
    Local {
        #[serde(default = "default_local_model")]
        model: String,
        #[serde(default)]
        cache_dir: Option<PathBuf>,
    },
    Remote {
        #[serde(default = "default_remote_api_key")]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_remote_model")]
        model: String,
        #[serde(default = "default_remote_dimensions")]
        dimensions: usize,
        #[serde(default = "default_remote_timeout")]
        timeout_secs: u64,
        #[serde(default = "default_remote_retries")]
        max_retries: u32,
    },
}

impl std::fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedderConfig::Mock { dimensions } => f
                .debug_struct("Mock")
                .field("dimensions", dimensions)
                .finish(),
            EmbedderConfig::Local { model, cache_dir } => f
                .debug_struct("Local")
                .field("model", model)
                .field("cache_dir", cache_dir)
                .finish(),
            EmbedderConfig::Remote {
                api_key: _,
                base_url,
                model,
                dimensions,
                timeout_secs,
                max_retries,
            } => f
                .debug_struct("Remote")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .field("dimensions", dimensions)
                .field("timeout_secs", timeout_secs)
                .field("max_retries", max_retries)
                .finish(),
        }
    }
}

fn default_mock_dimensions() -> usize {
    64
}
fn default_local_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}
fn default_remote_api_key() -> String {
    "${STARMARK_API_KEY}".to_string()
}
fn default_remote_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_remote_dimensions() -> usize {
    1536
}
fn default_remote_timeout() -> u64 {
    10
}
fn default_remote_retries() -> u32 {
    2
}

/// Top-level starmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarmarkConfig {
    /// Rating engine settings.
    pub engine: EngineConfig,
    /// Embedding backend to use for skill matching.
    pub embedder: EmbedderConfig,
    /// Directory where user records are stored.
    pub data_dir: PathBuf,
}

impl Default for StarmarkConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            embedder: default_embedder(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_embedder() -> EmbedderConfig {
    EmbedderConfig::Mock {
        dimensions: default_mock_dimensions(),
    }
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./starmark-data")
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in an embedder config.
fn resolve_embedder_config(config: &EmbedderConfig) -> EmbedderConfig {
    match config {
        EmbedderConfig::Mock { dimensions } => EmbedderConfig::Mock {
            dimensions: *dimensions,
        },
        EmbedderConfig::Local { model, cache_dir } => EmbedderConfig::Local {
            model: resolve_env_vars(model),
            cache_dir: cache_dir.clone(),
        },
        EmbedderConfig::Remote {
            api_key,
            base_url,
            model,
            dimensions,
            timeout_secs,
            max_retries,
        } => EmbedderConfig::Remote {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: resolve_env_vars(model),
            dimensions: *dimensions,
            timeout_secs: *timeout_secs,
            max_retries: *max_retries,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `starmark.toml` in the current directory
/// 2. `~/.config/starmark/config.toml`
///
/// Environment variable overrides: `STARMARK_EMBEDDER`,
/// `STARMARK_API_KEY`, `STARMARK_SIMILARITY_THRESHOLD`.
pub fn load_config() -> Result<StarmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StarmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("starmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StarmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StarmarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(backend) = std::env::var("STARMARK_EMBEDDER") {
        match backend.as_str() {
            "mock" => {
                if !matches!(config.embedder, EmbedderConfig::Mock { .. }) {
                    config.embedder = default_embedder();
                }
            }
            "local" => {
                if !matches!(config.embedder, EmbedderConfig::Local { .. }) {
                    config.embedder = EmbedderConfig::Local {
                        model: default_local_model(),
                        cache_dir: None,
                    };
                }
            }
            "remote" => {
                if !matches!(config.embedder, EmbedderConfig::Remote { .. }) {
                    config.embedder = EmbedderConfig::Remote {
                        api_key: default_remote_api_key(),
                        base_url: None,
                        model: default_remote_model(),
                        dimensions: default_remote_dimensions(),
                        timeout_secs: default_remote_timeout(),
                        max_retries: default_remote_retries(),
                    };
                }
            }
            other => warn!(backend = other, "unknown STARMARK_EMBEDDER value, ignoring"),
        }
    }

    if let Ok(key) = std::env::var("STARMARK_API_KEY") {
        if let EmbedderConfig::Remote { api_key, .. } = &mut config.embedder {
            *api_key = key;
        }
    }

    if let Ok(raw) = std::env::var("STARMARK_SIMILARITY_THRESHOLD") {
        match raw.parse::<f32>() {
            Ok(value) => config.engine.similarity_threshold = value,
            Err(_) => warn!(value = %raw, "unparseable STARMARK_SIMILARITY_THRESHOLD, ignoring"),
        }
    }

    config.embedder = resolve_embedder_config(&config.embedder);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("starmark"))
}

/// Create an embedder instance from its configuration.
pub async fn create_embedder(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
    match config {
        EmbedderConfig::Mock { dimensions } => Ok(Arc::new(MockEmbedder::new(*dimensions))),
        EmbedderConfig::Remote {
            api_key,
            base_url,
            model,
            dimensions,
            timeout_secs,
            max_retries,
        } => Ok(Arc::new(RemoteEmbedder::new(
            api_key,
            base_url.clone(),
            model,
            *dimensions,
            *timeout_secs,
            *max_retries,
        ))),
        #[cfg(feature = "local")]
        EmbedderConfig::Local { model, cache_dir } => Ok(Arc::new(
            crate::local::LocalEmbedder::load(model, cache_dir.clone()).await?,
        )),
        #[cfg(not(feature = "local"))]
        EmbedderConfig::Local { .. } => {
            anyhow::bail!(
                "this build has no local embedding support, rebuild with `--features local` \
                 or configure the mock or remote backend"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_STARMARK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_STARMARK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_STARMARK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_STARMARK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = StarmarkConfig::default();
        assert!(matches!(config.embedder, EmbedderConfig::Mock { .. }));
        assert_eq!(config.data_dir, PathBuf::from("./starmark-data"));
        assert!((config.engine.similarity_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
data_dir = "/tmp/starmark"

[engine]
similarity_threshold = 0.45
fallback_week = "none"

[embedder]
backend = "remote"
api_key = "sk-test"
model = "text-embedding-3-small"
timeout_secs = 5
"#;
        let config: StarmarkConfig = toml::from_str(toml_str).unwrap();
        assert!((config.engine.similarity_threshold - 0.45).abs() < f32::EPSILON);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/starmark"));
        match config.embedder {
            EmbedderConfig::Remote {
                api_key,
                timeout_secs,
                max_retries,
                ..
            } => {
                assert_eq!(api_key, "sk-test");
                assert_eq!(timeout_secs, 5);
                assert_eq!(max_retries, 2);
            }
            other => panic!("expected remote backend, got {other:?}"),
        }
    }

    #[test]
    fn parse_mock_backend_defaults() {
        let config: StarmarkConfig = toml::from_str("[embedder]\nbackend = \"mock\"\n").unwrap();
        assert!(matches!(
            config.embedder,
            EmbedderConfig::Mock { dimensions: 64 }
        ));
    }

    #[test]
    fn remote_api_key_resolves_from_env() {
        std::env::set_var("_STARMARK_KEY_VAR", "sk-resolved");
        let config = EmbedderConfig::Remote {
            api_key: "${_STARMARK_KEY_VAR}".to_string(),
            base_url: None,
            model: default_remote_model(),
            dimensions: default_remote_dimensions(),
            timeout_secs: default_remote_timeout(),
            max_retries: default_remote_retries(),
        };
        match resolve_embedder_config(&config) {
            EmbedderConfig::Remote { api_key, .. } => assert_eq!(api_key, "sk-resolved"),
            other => panic!("expected remote backend, got {other:?}"),
        }
        std::env::remove_var("_STARMARK_KEY_VAR");
    }

    #[test]
    fn debug_masks_api_key() {
        let config = EmbedderConfig::Remote {
            api_key: "sk-very-secret".to_string(),
            base_url: None,
            model: default_remote_model(),
            dimensions: default_remote_dimensions(),
            timeout_secs: default_remote_timeout(),
            max_retries: default_remote_retries(),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("starmark.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[engine]\nsimilarity_threshold = 0.6").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert!((config.engine.similarity_threshold - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_explicit_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/starmark.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[tokio::test]
    async fn factory_builds_mock() {
        let embedder = create_embedder(&EmbedderConfig::Mock { dimensions: 8 })
            .await
            .unwrap();
        assert_eq!(embedder.model_name(), "mock");
        assert_eq!(embedder.dimensions(), 8);
    }
}
