// file: src/search/mod.rs
// description: vector similarity search over the precomputed dataset index
// reference: semantic search stage of the two-stage pipeline

use crate::config::Config;
use crate::error::Result;
use crate::index::{EmbeddingClient, IndexClient};
use crate::models::{DatasetType, SearchResult};
use crate::utils::OperationTimer;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Collaborator contract for the similarity-search stage. The orchestration
/// layer depends on this trait so the index backend stays swappable and the
/// pipeline is testable without an index on disk.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Returns at most `top_k` rows in descending-similarity order.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;
}

/// Production search stage: embeds the query and runs a nearest-neighbour
/// query against the per-dataset-type LanceDB table.
pub struct LanceVectorSearch {
    client: IndexClient,
    embedder: EmbeddingClient,
    table_name: String,
}

impl LanceVectorSearch {
    pub async fn open(
        dataset_type: DatasetType,
        config: &Config,
        index_dir: Option<&Path>,
    ) -> Result<Self> {
        let dir = index_dir.unwrap_or(config.index.dir.as_path());
        let client = IndexClient::connect(dir).await?;
        let embedder = EmbeddingClient::new(&config.embedding, config.index.embedding_dim);
        let table_name = config.index.table_name(dataset_type).to_string();

        Ok(Self {
            client,
            embedder,
            table_name,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl VectorSearch for LanceVectorSearch {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let timer = OperationTimer::new("vector search");

        let query_embedding = self.embedder.embed_query(query).await;
        let rows = self
            .client
            .nearest(&self.table_name, query_embedding, top_k)
            .await?;

        info!(
            "Table '{}' returned {} of up to {} rows",
            self.table_name,
            rows.len(),
            top_k
        );
        timer.finish_with_count(rows.len());

        Ok(rows)
    }
}
