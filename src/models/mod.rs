// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod dataset;
pub mod search_result;
pub mod verdict;

pub use dataset::{DatasetRecord, DatasetType};
pub use search_result::{ResultTable, SearchResult};
pub use verdict::GptVerdict;
