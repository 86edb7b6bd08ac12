// file: src/exporter/csv.rs
// description: csv export of search result tables
// reference: https://docs.rs/csv

use crate::error::Result;
use crate::models::{DatasetType, ResultTable};
use crate::utils::Validator;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const BASE_HEADER: [&str; 8] = [
    "accession",
    "title",
    "summary",
    "organism",
    "platform",
    "num_samples",
    "score",
    "distance",
];

const VERDICT_HEADER: [&str; 3] = ["gpt_suitable", "gpt_confidence", "gpt_reasoning"];

#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Output filename convention: `results_{dataset_type}_{query}.csv` with
    /// the query sanitized for filesystem use.
    pub fn default_filename(dataset_type: DatasetType, query: &str) -> String {
        format!(
            "results_{}_{}.csv",
            dataset_type,
            Validator::sanitize_for_filename(query)
        )
    }

    /// Writes the table under the exporter's output directory. Returns the
    /// written path and row count.
    pub fn export(&self, table: &ResultTable, filename: &str) -> Result<(PathBuf, usize)> {
        let path = self.output_dir.join(filename);
        let count = Self::export_to_path(table, &path)?;
        Ok((path, count))
    }

    /// Writes the table to an explicit path. The three verdict columns are
    /// present only when at least one row carries a GPT verdict.
    pub fn export_to_path(table: &ResultTable, path: &Path) -> Result<usize> {
        let with_verdicts = table.has_verdicts();
        let mut writer = Writer::from_path(path)?;

        let mut header: Vec<&str> = BASE_HEADER.to_vec();
        if with_verdicts {
            header.extend(VERDICT_HEADER);
        }
        writer.write_record(&header)?;

        for row in table.rows() {
            let mut record = vec![
                row.record.accession.clone(),
                row.record.title.clone(),
                row.record.summary.clone(),
                row.record.organism.clone(),
                row.record.platform.clone(),
                row.record.num_samples.to_string(),
                format!("{:.6}", row.score),
                row.distance
                    .map(|d| format!("{:.6}", d))
                    .unwrap_or_default(),
            ];

            if with_verdicts {
                match &row.verdict {
                    Some(verdict) => {
                        record.push(verdict.suitable.to_string());
                        record.push(format!("{:.3}", verdict.confidence));
                        record.push(verdict.reasoning.clone());
                    }
                    None => record.extend([String::new(), String::new(), String::new()]),
                }
            }

            writer.write_record(&record)?;
        }

        writer.flush()?;
        info!("Wrote {} rows to {}", table.len(), path.display());

        Ok(table.len())
    }
}
