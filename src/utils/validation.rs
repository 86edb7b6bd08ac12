// file: src/utils/validation.rs
// description: request validation utilities and helpers
// reference: input validation patterns

use crate::error::{Result, SearchError};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

pub struct Validator;

impl Validator {
    /// Queries made of whitespace only are rejected before any collaborator
    /// is touched.
    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(SearchError::Validation("Query cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_top_k(top_k: usize) -> Result<()> {
        if top_k == 0 {
            return Err(SearchError::Validation(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if top_k > 10000 {
            return Err(SearchError::Validation(
                "top_k too large (max 10000)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_confidence_threshold(threshold: f32) -> Result<()> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(SearchError::Validation(format!(
                "Confidence threshold must be within [0.0, 1.0], got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SearchError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(SearchError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SearchError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_worker_count(workers: usize) -> Result<()> {
        if workers == 0 {
            return Err(SearchError::Validation(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if workers > 64 {
            return Err(SearchError::Validation(
                "Worker count too large (max 64)".to_string(),
            ));
        }

        Ok(())
    }

    /// Char-boundary safe truncation; GEO titles and summaries routinely
    /// contain non-ASCII symbols.
    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_length).collect();
            format!("{}...", truncated)
        }
    }

    /// Collapses anything unsafe in a query into underscores so it can be
    /// embedded in an output filename.
    pub fn sanitize_for_filename(text: &str) -> String {
        let replaced = UNSAFE_FILENAME_CHARS.replace_all(text.trim(), "_");
        let cleaned = replaced.trim_matches('_').to_string();

        if cleaned.is_empty() {
            "query".to_string()
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_query() {
        assert!(Validator::validate_query("breast cancer").is_ok());
        assert!(Validator::validate_query("").is_err());
        assert!(Validator::validate_query("   ").is_err());
        assert!(Validator::validate_query("\t\n").is_err());
    }

    #[test]
    fn test_validate_top_k() {
        assert!(Validator::validate_top_k(50).is_ok());
        assert!(Validator::validate_top_k(1).is_ok());
        assert!(Validator::validate_top_k(0).is_err());
        assert!(Validator::validate_top_k(10001).is_err());
    }

    #[test]
    fn test_validate_confidence_threshold() {
        assert!(Validator::validate_confidence_threshold(0.0).is_ok());
        assert!(Validator::validate_confidence_threshold(0.6).is_ok());
        assert!(Validator::validate_confidence_threshold(1.0).is_ok());
        assert!(Validator::validate_confidence_threshold(-0.1).is_err());
        assert!(Validator::validate_confidence_threshold(1.1).is_err());
        assert!(Validator::validate_confidence_threshold(f32::NAN).is_err());
    }

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://api.openai.com/v1").is_ok());
        assert!(Validator::validate_url("http://localhost:8080").is_ok());
        assert!(Validator::validate_url("api.openai.com").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_worker_count() {
        assert!(Validator::validate_worker_count(4).is_ok());
        assert!(Validator::validate_worker_count(0).is_err());
        assert!(Validator::validate_worker_count(65).is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
    }

    #[test]
    fn test_truncate_text_multibyte() {
        let text = "β-amyloid plaques in 5×FAD mice";
        let truncated = Validator::truncate_text(text, 10);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 13);
    }

    #[test]
    fn test_sanitize_for_filename() {
        assert_eq!(
            Validator::sanitize_for_filename("breast cancer"),
            "breast_cancer"
        );
        assert_eq!(
            Validator::sanitize_for_filename("TP53 / BRCA1 (human)"),
            "TP53_BRCA1_human"
        );
        assert_eq!(Validator::sanitize_for_filename("   "), "query");
        assert_eq!(Validator::sanitize_for_filename("a  b"), "a_b");
    }
}
