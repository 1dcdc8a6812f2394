//! Structural errors that abort an evaluation run

use std::path::PathBuf;

/// Errors raised while loading, merging or writing item tables, or when the
/// pipeline cannot start at all. Per-item oracle failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("cannot read input file {path}: {source}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("column mismatch in {path}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("no input tables to merge")]
    NoInputs,

    #[error("item table has no rows")]
    EmptyInput,

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("row {row}: gold label must be A or B, got '{value}'")]
    InvalidGoldLabel { row: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EvalResult<T> = Result<T, EvalError>;
