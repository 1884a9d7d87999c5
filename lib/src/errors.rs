// lib/src/errors.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Feature schema mismatch at column {position}: artifact has '{found}', service expects '{expected}'")]
    SchemaMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Input columns {found:?} do not match model columns {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Row {row} has {found} values, model expects {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Found unknown category {value} in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("Could not convert {value} to a number in column '{column}'")]
    NonNumeric { column: String, value: String },

    #[error("Model returned {found} {output} for {expected} rows")]
    OutputLength {
        output: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Model returned invalid probability {value} for row {row}")]
    InvalidProbability { row: usize, value: f64 },

    #[error("Scoring failed: {0}")]
    Internal(String),
}
