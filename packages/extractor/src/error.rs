//! Error types for the extractor.
//!
//! Only run-level failures surface as `ExtractorError`. Per-document and
//! per-field problems (unparseable XML, missing concordance variables,
//! uncompilable xpaths) degrade to absent values and are logged instead.

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download the concordance table.
    #[error("Failed to download concordance from {url}: {source}")]
    ConcordanceDownload {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The concordance table has no usable rows.
    #[error("Concordance table is empty: no rows with both variable_name and xpath{}", .source_name.as_ref().map(|s| format!(" in {s}")).unwrap_or_default())]
    EmptyConcordance { source_name: Option<String> },

    /// The concordance table is missing a required column.
    #[error("Concordance table is missing required column '{0}'")]
    MissingColumn(String),

    /// CSV decoding failed.
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractorError::Config("PARSE_WORKERS must be a number".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: PARSE_WORKERS must be a number"
        );
    }

    #[test]
    fn test_empty_concordance_with_source() {
        let err = ExtractorError::EmptyConcordance {
            source_name: Some("data/concordance/concordance.csv".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Concordance table is empty: no rows with both variable_name and xpath in data/concordance/concordance.csv"
        );
    }

    #[test]
    fn test_empty_concordance_without_source() {
        let err = ExtractorError::EmptyConcordance { source_name: None };
        assert_eq!(
            err.to_string(),
            "Concordance table is empty: no rows with both variable_name and xpath"
        );
    }

    #[test]
    fn test_missing_column_display() {
        let err = ExtractorError::MissingColumn("xpath".to_string());
        assert!(err.to_string().contains("'xpath'"));
    }
}
