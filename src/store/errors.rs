//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A writer panicked while holding the collection lock
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Document body was not a JSON object
    #[error("Document must be a JSON object")]
    NotAnObject,
}
