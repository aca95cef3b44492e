//! Error types for the comment graph analyzer

use thiserror::Error;

/// Errors raised by the analysis core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A record reached the graph builder without a required field.
    /// The normalizer drops such records, so this indicates a caller bug.
    #[error("record {index} has an empty `{field}` field")]
    InvalidRecord { index: usize, field: &'static str },
}
