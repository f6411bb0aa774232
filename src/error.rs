use thiserror::Error;

/// Structural problems that make a whole table unusable.
///
/// Row-level problems never show up here; bad rows are dropped by the loader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("CSV file is empty or invalid (found {lines} line(s), need a header and at least one row)")]
    TooFewLines { lines: usize },

    #[error("CSV missing required column: {0}")]
    MissingColumn(String),
}
