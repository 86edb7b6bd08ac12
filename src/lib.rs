// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod index;
pub mod models;
pub mod sdk;
pub mod search;
pub mod utils;

pub use config::{Config, EmbeddingConfig, GptConfig, IndexConfig};
pub use error::{Result, SearchError};
pub use exporter::CsvExporter;
pub use filter::{GptFilter, SuitabilityFilter};
pub use index::{EmbeddingClient, IndexClient, SchemaManager};
pub use models::{DatasetRecord, DatasetType, GptVerdict, ResultTable, SearchResult};
pub use sdk::{
    SearchOptions, search_datasets, search_microarray, search_rnaseq, search_with_gpt,
};
pub use search::{LanceVectorSearch, VectorSearch};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
