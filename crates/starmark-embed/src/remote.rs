//! Remote embedding backend for OpenAI-compatible APIs.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use starmark_core::traits::Embedder;

use crate::error::EmbedError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_DELAY_MS: u64 = 5_000;

/// Embedder backed by a `/v1/embeddings` HTTP endpoint.
pub struct RemoteEmbedder {
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout_secs: u64,
    max_retries: u32,
    client: reqwest::Client,
}

impl RemoteEmbedder {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: &str,
        dimensions: usize,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.to_string(),
            dimensions,
            timeout_secs,
            max_retries,
            client,
        }
    }

    #[instrument(skip(self, input), fields(model = %self.model, texts = input.len()))]
    async fn request_with_retry(&self, input: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut attempt = 0u32;
        loop {
            match self.request_once(&input).await {
                Ok(vectors) => return Ok(vectors),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    attempt += 1;
                    let delay = match &err {
                        EmbedError::RateLimited { retry_after_ms } => {
                            Duration::from_millis((*retry_after_ms).min(MAX_RETRY_DELAY_MS))
                        }
                        _ => Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)),
                    };
                    warn!(attempt, error = %err, "embedding request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn request_once(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = EmbeddingsRequest {
            model: self.model.clone(),
            input: input.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbedError::Timeout(self.timeout_secs)
                } else {
                    EmbedError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(EmbedError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError {
                status,
                message: body,
            });
        }

        let api_response: EmbeddingsResponse =
            response.json().await.map_err(|e| EmbedError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        if api_response.data.len() != input.len() {
            return Err(EmbedError::ApiError {
                status: 0,
                message: format!(
                    "expected {} embeddings, got {}",
                    input.len(),
                    api_response.data.len()
                ),
            });
        }

        // The API is not required to preserve input order; index says
        // which input each vector belongs to.
        let mut data = api_response.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.request_with_retry(vec![text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            EmbedError::ApiError {
                status: 0,
                message: "response contained no embeddings".to_string(),
            }
            .into()
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_with_retry(texts.to_vec()).await
    }
}
