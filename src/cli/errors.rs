//! CLI-specific error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Seed file missing or unreadable
    #[error("Cannot read {path}: {source}")]
    SeedFileUnreadable { path: PathBuf, source: io::Error },

    /// Seed file is not a JSON array of documents
    #[error("Seed file must contain a JSON array of tour documents")]
    SeedFileMalformed(#[from] serde_json::Error),

    /// A seed document failed validation or insertion
    #[error("Seed document {index}: {message}")]
    SeedDocumentRejected { index: usize, message: String },

    /// Server failed to bind or crashed
    #[error("Server error: {0}")]
    Server(#[from] io::Error),
}
