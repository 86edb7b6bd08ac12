// file: src/exporter/mod.rs
// description: result export module exports
// reference: internal module structure

pub mod csv;

pub use csv::CsvExporter;
