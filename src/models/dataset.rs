// file: src/models/dataset.rs
// description: GEO dataset record model and dataset type selection
// reference: https://www.ncbi.nlm.nih.gov/geo/info/overview.html

use crate::error::SearchError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref ACCESSION_PATTERN: Regex = Regex::new(r"^GSE\d+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum DatasetType {
    Microarray,
    RnaSeq,
}

impl DatasetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Microarray => "microarray",
            DatasetType::RnaSeq => "rnaseq",
        }
    }

    pub fn all() -> [DatasetType; 2] {
        [DatasetType::Microarray, DatasetType::RnaSeq]
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "microarray" => Ok(DatasetType::Microarray),
            "rnaseq" | "rna-seq" => Ok(DatasetType::RnaSeq),
            other => Err(SearchError::Validation(format!(
                "Unknown dataset type '{}' (expected 'microarray' or 'rnaseq')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub accession: String,
    pub title: String,
    pub summary: String,
    pub organism: String,
    pub platform: String,
    pub num_samples: u64,
}

impl DatasetRecord {
    pub fn new(
        accession: String,
        title: String,
        summary: String,
        organism: String,
        platform: String,
        num_samples: u64,
    ) -> Self {
        Self {
            accession,
            title,
            summary,
            organism,
            platform,
            num_samples,
        }
    }

    /// GEO series accessions look like GSE12345.
    pub fn is_valid_accession(accession: &str) -> bool {
        ACCESSION_PATTERN.is_match(accession)
    }
}
