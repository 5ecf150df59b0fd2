// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the loading, matching and duplicate-review stages.
///
/// Every stage returns these to its caller; the operation runner turns them
/// into a logged failure for that operation and moves on to the next one.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("the file {} does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error("the table loaded from {} is empty", .0.display())]
    EmptySource(PathBuf),
    #[error("required columns {missing:?} not found in {}", .path.display())]
    Schema { path: PathBuf, missing: Vec<String> },
    #[error("cannot match empty record sets (left: {left} rows, right: {right} rows)")]
    EmptyInput { left: usize, right: usize },
    #[error("malformed matched table {source_name}: {reason}")]
    MalformedTable { source_name: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MatchingResult<T> = Result<T, MatchingError>;

impl MatchingError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchingError::MalformedTable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
