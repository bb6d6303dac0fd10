//! Error types for Facebook Quantifier

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while quantifying an export
///
/// Only [`QuantifyError::ExportRootNotFound`] and output failures abort a run.
/// Document and timestamp failures are caught by the extractors and turned
/// into soft warnings on the run report.
#[derive(Debug, Error)]
pub enum QuantifyError {
    #[error("Export root not found or not a directory: {0}")]
    ExportRootNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Unparseable timestamp: {0}")]
    UnparseableTimestamp(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QuantifyError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        QuantifyError::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
