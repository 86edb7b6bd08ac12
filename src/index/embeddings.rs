// file: src/index/embeddings.rs
// description: query embedding client with deterministic offline fallback
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::EmbeddingConfig;
use crate::error::{Result, SearchError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: Vec<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeds query text through an OpenAI-compatible /embeddings endpoint.
/// Queries must land in the same vector space as the index, so the returned
/// dimension is checked against the configured index dimension.
pub struct EmbeddingClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    dim: usize,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig, dim: usize) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dim,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Embeds a query, falling back to the deterministic embedding when no
    /// key is configured or the API misbehaves. Searching a real index with
    /// the fallback gives poor rankings, hence the warnings, but it keeps
    /// offline smoke tests working.
    pub async fn embed_query(&self, text: &str) -> Vec<f32> {
        let Some(api_key) = self.api_key.clone() else {
            warn!("No embedding API key configured, using fallback embedding");
            return Self::fallback_embedding(text, self.dim);
        };

        match self.generate_embedding(text, &api_key).await {
            Ok(embedding) if embedding.len() == self.dim => embedding,
            Ok(embedding) => {
                warn!(
                    "Embedding API returned dimension {}, expected {}. Using fallback.",
                    embedding.len(),
                    self.dim
                );
                Self::fallback_embedding(text, self.dim)
            }
            Err(e) => {
                warn!("Embedding API failed: {}. Using fallback.", e);
                Self::fallback_embedding(text, self.dim)
            }
        }
    }

    async fn generate_embedding(&self, text: &str, api_key: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.api_url);

        let request = EmbeddingRequest {
            input: vec![text.to_string()],
            model: self.model.clone(),
        };

        debug!("Requesting embedding for {} chars", text.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Embedding(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchError::Embedding(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Embedding(format!("Failed to parse response: {}", e)))?;

        if let Some(embedding_data) = embedding_response.data.into_iter().next() {
            info!(
                "Received embedding of dimension {}",
                embedding_data.embedding.len()
            );
            Ok(embedding_data.embedding)
        } else {
            Err(SearchError::Embedding(
                "No embedding data returned".to_string(),
            ))
        }
    }

    /// Deterministic hash-based embedding for keyless/offline operation.
    pub fn fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        (0..dim)
            .map(|i| (hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0)
            .collect()
    }
}
