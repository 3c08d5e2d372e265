//! Domain errors surfaced to the user before any sorting work begins.
//!
//! Every variant renders with a stable leading phrase ("No header row",
//! "Missing columns", "Encoding error", "Language column missing", ...) so
//! callers and scripts can match on it. Plumbing errors (I/O, CSV syntax)
//! travel as `anyhow::Error` with context instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("No header row")]
    MissingHeader,

    #[error("Missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Encoding error: input is not valid {encoding} ({detail})")]
    Encoding {
        encoding: &'static str,
        detail: String,
    },

    #[error("Language column missing: '{column}' not found in header")]
    LanguageColumnMissing { column: String },

    #[error("Duplicate column '{column}' in header")]
    DuplicateColumn { column: String },

    #[error("No sort columns specified")]
    NoSortColumns,

    #[error("Invalid sort column '{spec}'")]
    InvalidSortColumn { spec: String },

    #[error("Language order cannot be empty when language sorting is enabled")]
    EmptyLanguageOrder,
}
