// file: src/filter/mod.rs
// description: GPT suitability filter over search results
// reference: optional second stage of the search pipeline

pub mod chat;

use crate::config::GptConfig;
use crate::error::Result;
use crate::models::{DatasetRecord, GptVerdict, SearchResult};
use crate::utils::{OperationTimer, Validator};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

pub use chat::ChatClient;

const SYSTEM_PROMPT: &str = "You are an expert in gene-expression analysis. \
Given a disease of interest and the metadata of a GEO series, judge whether \
the dataset is suitable for differential-expression analysis of that disease: \
it should concern the disease and contain a usable case/control or condition \
contrast with adequate samples. Respond with a single JSON object of the form \
{\"suitable\": true|false, \"confidence\": 0.0-1.0, \"reasoning\": \"...\"} \
and nothing else.";

/// Collaborator contract for the optional suitability stage. Takes the rows
/// from the search stage together with the disease context and returns the
/// filtered (or fully annotated) rows, order unchanged.
#[async_trait]
pub trait SuitabilityFilter: Send + Sync {
    async fn filter(
        &self,
        rows: Vec<SearchResult>,
        disease: &str,
        confidence_threshold: f32,
        return_all: bool,
    ) -> Result<Vec<SearchResult>>;
}

/// Production filter: one chat-completion judgment per row, issued with
/// bounded parallelism. `buffered` keeps the rows in their incoming
/// descending-similarity order.
pub struct GptFilter {
    chat: ChatClient,
    max_workers: usize,
}

impl GptFilter {
    pub fn new(config: &GptConfig) -> Result<Self> {
        Ok(Self {
            chat: ChatClient::new(config)?,
            max_workers: config.max_workers.max(1),
        })
    }

    fn build_prompt(disease: &str, record: &DatasetRecord) -> String {
        format!(
            "Disease of interest: {}\n\n\
             Dataset {}\n\
             Title: {}\n\
             Organism: {}\n\
             Platform: {}\n\
             Samples: {}\n\
             Summary: {}",
            disease,
            record.accession,
            record.title,
            record.organism,
            record.platform,
            record.num_samples,
            Validator::truncate_text(&record.summary, 1500),
        )
    }

    async fn judge(&self, row: SearchResult, disease: &str) -> Result<SearchResult> {
        let prompt = Self::build_prompt(disease, &row.record);
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;
        let verdict = GptVerdict::parse_reply(&reply)?;

        debug!(
            "{}: {} (confidence {:.2})",
            row.record.accession,
            verdict.label(),
            verdict.confidence
        );

        Ok(row.with_verdict(verdict))
    }
}

#[async_trait]
impl SuitabilityFilter for GptFilter {
    async fn filter(
        &self,
        rows: Vec<SearchResult>,
        disease: &str,
        confidence_threshold: f32,
        return_all: bool,
    ) -> Result<Vec<SearchResult>> {
        let timer = OperationTimer::new("gpt filter");
        let total = rows.len();

        let annotated: Vec<SearchResult> =
            stream::iter(rows.into_iter().map(|row| self.judge(row, disease)))
                .buffered(self.max_workers)
                .try_collect()
                .await?;

        let kept = apply_retention(annotated, confidence_threshold, return_all);

        info!(
            "GPT filter kept {} of {} rows (threshold {:.2}, return_all {})",
            kept.len(),
            total,
            confidence_threshold,
            return_all
        );
        timer.finish_with_count(kept.len());

        Ok(kept)
    }
}

/// Retention rule for annotated rows: keep a row only when the verdict is
/// suitable with confidence at or above the threshold. With `return_all`
/// every annotated row comes back and the caller inspects verdicts itself.
fn apply_retention(
    rows: Vec<SearchResult>,
    confidence_threshold: f32,
    return_all: bool,
) -> Vec<SearchResult> {
    if return_all {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            row.verdict
                .as_ref()
                .is_some_and(|verdict| verdict.passes(confidence_threshold))
        })
        .collect()
}
