//! Failure taxonomy shared by the ingestion, query and seeding components.
//!
//! Each variant corresponds to one boundary condition. Components convert these
//! into a logged message plus a sentinel return; they never escape
//! [`crate::seed`], [`crate::ingest`] or [`crate::query`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("store {path:?} is unavailable: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("source file {0:?} not found")]
    SourceMissing(PathBuf),
    #[error("failed to read source {path:?}: {message}")]
    SourceRead { path: PathBuf, message: String },
    #[error("line {line}: {reason}")]
    RowMapping { line: usize, reason: MappingError },
    #[error("query failed: {0}")]
    QueryFailure(#[from] rusqlite::Error),
}

/// Why a single source record could not be turned into a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("field '{field}' has invalid value '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field '{field}' must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
