// file: src/index/client.rs
// description: read-only LanceDB client over the precomputed dataset index
// reference: https://docs.rs/lancedb

use crate::error::{Result, SearchError};
use crate::models::{DatasetRecord, SearchResult};
use arrow_array::{Float32Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::SchemaRef;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use std::path::Path;
use tracing::{debug, info, warn};

/// Connection wrapper over the dataset index directory. The index is built
/// elsewhere; this client only opens and queries it.
#[derive(Clone)]
pub struct IndexClient {
    connection: Connection,
    dir: String,
}

impl IndexClient {
    pub async fn connect(dir: &Path) -> Result<Self> {
        let dir = dir.to_string_lossy().to_string();
        info!("Connecting to dataset index at {}", dir);

        let connection = connect(&dir)
            .execute()
            .await
            .map_err(|e| SearchError::Index(format!("Failed to open index at {}: {}", dir, e)))?;

        Ok(Self { connection, dir })
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking index connection");

        match self.connection.table_names().execute().await {
            Ok(_) => Ok(true),
            Err(e) => Err(SearchError::Index(format!(
                "Index connection failed: {}",
                e
            ))),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| SearchError::Index(format!("Failed to list index tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    async fn open_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| {
                SearchError::Index(format!("Failed to open table {}: {}", table_name, e))
            })
    }

    pub async fn table_schema(&self, table_name: &str) -> Result<SchemaRef> {
        let table = self.open_table(table_name).await?;
        table.schema().await.map_err(|e| {
            SearchError::Index(format!(
                "Failed to read schema of table {}: {}",
                table_name, e
            ))
        })
    }

    pub async fn dataset_count(&self, table_name: &str) -> Result<u64> {
        let table = self.open_table(table_name).await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| SearchError::Index(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Nearest-neighbour query over one dataset table. Returns at most
    /// `top_k` rows in descending-similarity order.
    ///
    /// A missing table is an error rather than an empty result: the index is
    /// an installed artifact, and an absent table means a broken install.
    pub async fn nearest(
        &self,
        table_name: &str,
        query_embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if !self.table_exists(table_name).await? {
            return Err(SearchError::Index(format!(
                "Index table '{}' not found in {} (is the index installed?)",
                table_name, self.dir
            )));
        }

        let table = self.open_table(table_name).await?;

        info!("Searching table '{}' with top_k {}", table_name, top_k);

        let query = table
            .vector_search(query_embedding)
            .map_err(|e| SearchError::Index(format!("Failed to create vector search: {}", e)))?
            .limit(top_k);

        let mut results_stream = query
            .execute()
            .await
            .map_err(|e| SearchError::Index(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result
                .map_err(|e| SearchError::Index(format!("Failed to read result batch: {}", e)))?;
            search_results.extend(batch_to_results(&batch)?);
        }

        info!("Vector search returned {} results", search_results.len());
        Ok(search_results)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| SearchError::Index(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| SearchError::Index(format!("Invalid '{}' column type", name)))
}

/// Converts one Arrow record batch from the index into typed result rows.
/// Rows carrying a malformed accession are dropped with a warning; the index
/// builder should never produce them, but a single bad row must not sink the
/// whole query.
pub(crate) fn batch_to_results(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
    let num_rows = batch.num_rows();

    let accessions = string_column(batch, "accession")?;
    let titles = string_column(batch, "title")?;
    let summaries = string_column(batch, "summary")?;
    let organisms = string_column(batch, "organism")?;
    let platforms = string_column(batch, "platform")?;

    let sample_counts = batch
        .column_by_name("num_samples")
        .ok_or_else(|| SearchError::Index("Missing 'num_samples' column".to_string()))?
        .as_any()
        .downcast_ref::<UInt64Array>()
        .ok_or_else(|| SearchError::Index("Invalid 'num_samples' column type".to_string()))?;

    // LanceDB reports the query distance in a reserved column
    let distances = batch
        .column_by_name("_distance")
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let mut rows = Vec::with_capacity(num_rows);

    for i in 0..num_rows {
        let accession = accessions.value(i).to_string();

        if !DatasetRecord::is_valid_accession(&accession) {
            warn!("Dropping row with malformed accession: '{}'", accession);
            continue;
        }

        let record = DatasetRecord::new(
            accession,
            titles.value(i).to_string(),
            summaries.value(i).to_string(),
            organisms.value(i).to_string(),
            platforms.value(i).to_string(),
            sample_counts.value(i),
        );

        let row = if let Some(dist_array) = distances {
            SearchResult::from_distance(record, dist_array.value(i))
        } else {
            SearchResult::new(record, 1.0, None)
        };

        rows.push(row);
    }

    Ok(rows)
}
