// file: src/sdk.rs
// description: search_datasets orchestration and convenience wrappers
// reference: two-stage search pipeline (vector search, optional GPT filter)

use crate::config::Config;
use crate::error::Result;
use crate::filter::{GptFilter, SuitabilityFilter};
use crate::models::{DatasetType, ResultTable};
use crate::search::{LanceVectorSearch, VectorSearch};
use crate::utils::Validator;
use std::path::PathBuf;
use tracing::{info, warn};

/// Options for `search_datasets`, with the defaults of the SDK surface.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub dataset_type: DatasetType,
    pub top_k: usize,
    pub use_gpt_filter: bool,
    pub confidence_threshold: f32,
    pub return_all_gpt_results: bool,
    /// Overrides the configured index location when set.
    pub index_dir: Option<PathBuf>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            dataset_type: DatasetType::Microarray,
            top_k: 50,
            use_gpt_filter: false,
            confidence_threshold: 0.6,
            return_all_gpt_results: false,
            index_dir: None,
        }
    }
}

/// Search for genomic datasets with optional GPT suitability filtering.
///
/// Runs the vector similarity search for `query` against the index table of
/// the requested dataset type, then, when `use_gpt_filter` is set, passes the
/// rows through the chat-LLM suitability filter using the same query as the
/// disease context. Collaborator failures propagate unchanged.
pub async fn search_datasets(
    query: &str,
    options: &SearchOptions,
    config: &Config,
) -> Result<ResultTable> {
    // Input is rejected before any collaborator is constructed, so a bad
    // query never touches the index or the API.
    validate_inputs(query, options)?;

    let search =
        LanceVectorSearch::open(options.dataset_type, config, options.index_dir.as_deref())
            .await?;

    if options.use_gpt_filter {
        run_search(query, options, &search, Some(|| GptFilter::new(&config.gpt))).await
    } else {
        run_search(query, options, &search, None::<fn() -> Result<GptFilter>>).await
    }
}

/// Search microarray datasets with default options.
pub async fn search_microarray(query: &str, config: &Config) -> Result<ResultTable> {
    let options = SearchOptions {
        dataset_type: DatasetType::Microarray,
        ..Default::default()
    };
    search_datasets(query, &options, config).await
}

/// Search RNA-seq datasets with default options.
pub async fn search_rnaseq(query: &str, config: &Config) -> Result<ResultTable> {
    let options = SearchOptions {
        dataset_type: DatasetType::RnaSeq,
        ..Default::default()
    };
    search_datasets(query, &options, config).await
}

/// Search with GPT filtering enabled.
pub async fn search_with_gpt(query: &str, config: &Config) -> Result<ResultTable> {
    let options = SearchOptions {
        use_gpt_filter: true,
        ..Default::default()
    };
    search_datasets(query, &options, config).await
}

fn validate_inputs(query: &str, options: &SearchOptions) -> Result<()> {
    Validator::validate_query(query)?;
    Validator::validate_top_k(options.top_k)?;
    Validator::validate_confidence_threshold(options.confidence_threshold)?;
    Ok(())
}

/// Pipeline core over the two collaborator contracts. `search_datasets`
/// delegates here with the production collaborators; tests drive it with
/// mocks.
///
/// The filter is handed in as a factory and constructed only once the search
/// stage has returned rows: an empty result short-circuits before the filter
/// exists at all, so construction failures (a missing API key, say) cannot
/// surface for queries with nothing to filter.
pub async fn run_search<V, F, M>(
    query: &str,
    options: &SearchOptions,
    search: &V,
    make_filter: Option<M>,
) -> Result<ResultTable>
where
    V: VectorSearch + ?Sized,
    F: SuitabilityFilter,
    M: FnOnce() -> Result<F>,
{
    validate_inputs(query, options)?;

    info!(
        "Searching for: '{}' (dataset_type={})",
        query, options.dataset_type
    );

    let rows = search.search(query, options.top_k).await?;

    if rows.is_empty() {
        warn!("No results found from semantic search");
        return Ok(ResultTable::empty());
    }

    info!("Found {} results from semantic search", rows.len());

    let rows = match make_filter {
        Some(make_filter) => {
            info!("Applying GPT filtering for query: '{}'", query);
            let filter = make_filter()?;
            let filtered = filter
                .filter(
                    rows,
                    query,
                    options.confidence_threshold,
                    options.return_all_gpt_results,
                )
                .await?;
            info!("GPT filtering completed: {} results", filtered.len());
            filtered
        }
        None => rows,
    };

    Ok(ResultTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::models::{DatasetRecord, GptVerdict, SearchResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(accession: &str, distance: f32) -> SearchResult {
        SearchResult::from_distance(
            DatasetRecord::new(
                accession.to_string(),
                "some dataset".to_string(),
                "some summary".to_string(),
                "Homo sapiens".to_string(),
                "GPL570".to_string(),
                12,
            ),
            distance,
        )
    }

    struct MockSearch {
        rows: Vec<SearchResult>,
        calls: Arc<AtomicUsize>,
    }

    impl MockSearch {
        fn returning(rows: Vec<SearchResult>) -> Self {
            Self {
                rows,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl VectorSearch for MockSearch {
        async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.clone();
            rows.truncate(top_k);
            Ok(rows)
        }
    }

    /// Annotates every row as suitable with fixed confidence.
    struct MockFilter {
        confidence: f32,
        calls: Arc<AtomicUsize>,
    }

    impl MockFilter {
        fn with_confidence(confidence: f32) -> Self {
            Self {
                confidence,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl SuitabilityFilter for MockFilter {
        async fn filter(
            &self,
            rows: Vec<SearchResult>,
            _disease: &str,
            confidence_threshold: f32,
            return_all: bool,
        ) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let annotated: Vec<SearchResult> = rows
                .into_iter()
                .map(|row| {
                    row.with_verdict(GptVerdict::new(true, self.confidence, String::new()))
                })
                .collect();

            if return_all || self.confidence >= confidence_threshold {
                Ok(annotated)
            } else {
                Ok(Vec::new())
            }
        }
    }

    /// Counts factory invocations so tests can pin down when the filter is
    /// actually constructed.
    fn counted_factory(
        filter: MockFilter,
    ) -> (impl FnOnce() -> Result<MockFilter>, Arc<AtomicUsize>) {
        let constructions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructions);
        let factory = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(filter)
        };
        (factory, constructions)
    }

    fn no_filter() -> Option<fn() -> Result<MockFilter>> {
        None
    }

    #[tokio::test]
    async fn test_empty_query_errors_before_search() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let options = SearchOptions::default();

        for query in ["", "   ", "\t\n"] {
            let filter = MockFilter::with_confidence(0.9);
            let filter_calls = Arc::clone(&filter.calls);
            let (factory, constructions) = counted_factory(filter);

            let result = run_search(query, &options, &search, Some(factory)).await;
            assert!(matches!(result, Err(SearchError::Validation(_))));
            assert_eq!(constructions.load(Ordering::SeqCst), 0);
            assert_eq!(filter_calls.load(Ordering::SeqCst), 0);
        }

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_top_k_errors() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let options = SearchOptions {
            top_k: 0,
            ..Default::default()
        };

        let result = run_search("cancer", &options, &search, no_filter()).await;
        assert!(matches!(result, Err(SearchError::Validation(_))));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_errors() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let options = SearchOptions {
            confidence_threshold: 1.5,
            ..Default::default()
        };

        let result = run_search("cancer", &options, &search, no_filter()).await;
        assert!(matches!(result, Err(SearchError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_results_short_circuit_filter() {
        let search = MockSearch::returning(Vec::new());
        let filter = MockFilter::with_confidence(0.9);
        let filter_calls = Arc::clone(&filter.calls);
        let (factory, constructions) = counted_factory(filter);
        let options = SearchOptions::default();

        let table = run_search("ultra rare disease", &options, &search, Some(factory))
            .await
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(constructions.load(Ordering::SeqCst), 0);
        assert_eq!(filter_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_results_ignore_broken_filter_config() {
        // A keyless setup must still get its empty table back: the factory
        // would fail, but it never runs when the search finds nothing.
        let search = MockSearch::returning(Vec::new());
        let options = SearchOptions {
            use_gpt_filter: true,
            ..Default::default()
        };

        let factory = || -> Result<MockFilter> {
            Err(SearchError::Config(
                "GPT filter requires an API key".to_string(),
            ))
        };

        let table = run_search("ultra rare disease", &options, &search, Some(factory))
            .await
            .unwrap();

        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_filter_construction_failure_surfaces_with_results() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let options = SearchOptions::default();

        let factory = || -> Result<MockFilter> {
            Err(SearchError::Config(
                "GPT filter requires an API key".to_string(),
            ))
        };

        let result = run_search("cancer", &options, &search, Some(factory)).await;
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[tokio::test]
    async fn test_result_count_bounded_by_top_k() {
        let rows: Vec<SearchResult> = (1..=20)
            .map(|i| row(&format!("GSE{}", i), i as f32 / 10.0))
            .collect();
        let search = MockSearch::returning(rows);
        let options = SearchOptions {
            top_k: 5,
            ..Default::default()
        };

        let table = run_search("cancer", &options, &search, no_filter())
            .await
            .unwrap();

        assert_eq!(table.len(), 5);
    }

    #[tokio::test]
    async fn test_filter_applied_and_order_preserved() {
        let search = MockSearch::returning(vec![
            row("GSE1", 0.1),
            row("GSE2", 0.2),
            row("GSE3", 0.3),
        ]);
        let filter = MockFilter::with_confidence(0.9);
        let filter_calls = Arc::clone(&filter.calls);
        let (factory, constructions) = counted_factory(filter);
        let options = SearchOptions {
            use_gpt_filter: true,
            ..Default::default()
        };

        let table = run_search("cancer", &options, &search, Some(factory))
            .await
            .unwrap();

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert_eq!(filter_calls.load(Ordering::SeqCst), 1);
        assert!(table.has_verdicts());

        let accessions: Vec<&str> = table
            .rows()
            .iter()
            .map(|r| r.record.accession.as_str())
            .collect();
        assert_eq!(accessions, vec!["GSE1", "GSE2", "GSE3"]);

        for pair in table.rows().windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_low_confidence_filter_drops_rows() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let (factory, _) = counted_factory(MockFilter::with_confidence(0.3));
        let options = SearchOptions {
            use_gpt_filter: true,
            confidence_threshold: 0.6,
            ..Default::default()
        };

        let table = run_search("cancer", &options, &search, Some(factory))
            .await
            .unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_return_all_keeps_annotated_rows() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1), row("GSE2", 0.2)]);
        let (factory, _) = counted_factory(MockFilter::with_confidence(0.3));
        let options = SearchOptions {
            use_gpt_filter: true,
            confidence_threshold: 0.6,
            return_all_gpt_results: true,
            ..Default::default()
        };

        let table = run_search("cancer", &options, &search, Some(factory))
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_verdicts());
    }

    #[tokio::test]
    async fn test_no_filter_rows_pass_through_unannotated() {
        let search = MockSearch::returning(vec![row("GSE1", 0.1)]);
        let options = SearchOptions::default();

        let table = run_search("cancer", &options, &search, no_filter())
            .await
            .unwrap();

        assert_eq!(table.len(), 1);
        assert!(!table.has_verdicts());
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        struct FailingSearch;

        #[async_trait]
        impl VectorSearch for FailingSearch {
            async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<SearchResult>> {
                Err(SearchError::Index("table 'microarray' not found".to_string()))
            }
        }

        let options = SearchOptions::default();
        let result = run_search("cancer", &options, &FailingSearch, no_filter()).await;

        assert!(matches!(result, Err(SearchError::Index(_))));
    }

    #[test]
    fn test_default_options_match_sdk_defaults() {
        let options = SearchOptions::default();

        assert_eq!(options.dataset_type, DatasetType::Microarray);
        assert_eq!(options.top_k, 50);
        assert!(!options.use_gpt_filter);
        assert_eq!(options.confidence_threshold, 0.6);
        assert!(!options.return_all_gpt_results);
        assert!(options.index_dir.is_none());
    }
}
