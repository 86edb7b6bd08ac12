// file: src/models/search_result.rs
// description: search result rows and the result table returned by the SDK
// reference: Used for vector similarity search results

use crate::models::{DatasetRecord, GptVerdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Dataset metadata from the vector index
    pub record: DatasetRecord,

    /// Similarity score (higher is more similar, typically 0.0-1.0)
    pub score: f32,

    /// Optional: Distance metric (lower is more similar)
    pub distance: Option<f32>,

    /// GPT suitability verdict, present after filtering
    pub verdict: Option<GptVerdict>,
}

impl SearchResult {
    pub fn new(record: DatasetRecord, score: f32, distance: Option<f32>) -> Self {
        Self {
            record,
            score,
            distance,
            verdict: None,
        }
    }

    /// Builds a result from an index distance. Similarity decays from 1.0 as
    /// distance grows.
    pub fn from_distance(record: DatasetRecord, distance: f32) -> Self {
        Self::new(record, 1.0 / (1.0 + distance), Some(distance))
    }

    pub fn with_verdict(mut self, verdict: GptVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_title_len: usize) -> String {
        let title_preview = if self.record.title.chars().count() > max_title_len {
            let truncated: String = self.record.title.chars().take(max_title_len).collect();
            format!("{}...", truncated)
        } else {
            self.record.title.clone()
        };

        format!(
            "Score: {:.4} | {} ({}, {} samples)\n{}\n",
            self.score, self.record.accession, self.record.organism, self.record.num_samples, title_preview
        )
    }
}

/// Ordered collection of search results, the table handed back by
/// `search_datasets` and consumed by the CSV exporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<SearchResult>,
}

impl ResultTable {
    pub fn new(rows: Vec<SearchResult>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SearchResult] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SearchResult> {
        self.rows
    }

    /// True when at least one row carries a GPT verdict, which decides
    /// whether verdict columns appear in exports.
    pub fn has_verdicts(&self) -> bool {
        self.rows.iter().any(|row| row.verdict.is_some())
    }
}

impl From<Vec<SearchResult>> for ResultTable {
    fn from(rows: Vec<SearchResult>) -> Self {
        Self::new(rows)
    }
}
