//! # Embedding Capability Module
//!
//! ## Purpose
//! Defines the text-embedding capability the index store consumes: a batch of
//! strings in, one fixed-width float vector per string out. The store treats
//! the capability as opaque; everything model-specific lives behind the trait.
//!
//! ## Input/Output Specification
//! - **Input**: Batch of searchable texts or a single-query batch
//! - **Output**: One `Vec<f32>` per input, all of the advertised dimension
//! - **Providers**: Remote inference endpoint (reqwest) or deterministic hashing
//!
//! ## Key Features
//! - Whole-corpus batching in one call for build-time efficiency
//! - Deterministic hashing provider for tests, development, and offline use
//! - Provider selection via configuration

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::errors::{Result, SearchError};
use async_trait::async_trait;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;
use twox_hash::XxHash64;

/// Text embedding capability consumed by the index store.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Stable identifier for the model, reported in stats
    fn model_name(&self) -> &str;

    /// Width of the vectors this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build the configured embedding capability.
pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn TextEmbedder>> {
    match config.provider {
        EmbeddingProvider::Http => Ok(Arc::new(HttpEmbedder::new(config)?)),
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimension))),
    }
}

/// Remote embedding capability speaking the text-embeddings-inference wire
/// format: `POST {endpoint}/embed` with `{"inputs": [...]}`, answered by an
/// array of float vectors.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model_name: String,
    dimension: usize,
}

#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

impl HttpEmbedder {
    /// Create a new remote embedder from configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SearchError::EmbeddingFailure {
                details: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl TextEmbedder for HttpEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await?
            .error_for_status()?;

        let vectors: Vec<Vec<f32>> = response.json().await?;

        if vectors.len() != texts.len() {
            return Err(SearchError::EmbeddingFailure {
                details: format!(
                    "endpoint returned {} vectors for {} inputs",
                    vectors.len(),
                    texts.len()
                ),
            });
        }

        Ok(vectors)
    }
}

/// Deterministic token-hashing embedder.
///
/// Each whitespace token is lowercased and hashed into a bucket of the output
/// vector; the accumulated bucket weights give texts sharing vocabulary a
/// positive inner product. No semantics, but fully reproducible, which is what
/// tests and offline development need.
pub struct HashingEmbedder {
    model_name: String,
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder with the given vector width
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: format!("hashing:xxh64:d{}", dimension),
            dimension,
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let hash = hasher.finish();
            let bucket = (hash as usize) % self.dimension;
            // High bits spread token weights so distinct vocabularies do not
            // collapse onto identical vectors
            let weight = 1.0 + ((hash >> 32) as u32 as f32) / (u32::MAX as f32);
            vector[bucket] += weight;
        }
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
