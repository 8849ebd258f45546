//! # Upload Errors

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Photo upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// Content type was not image/*
    #[error("Only image files are allowed!")]
    NotAnImage,

    /// Payload exceeded the size cap
    #[error("File too large: {0} bytes")]
    TooLarge(usize),

    /// Filesystem failure
    #[error("Upload failed: {0}")]
    Io(String),
}

impl UploadError {
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::NotAnImage => 400,
            UploadError::TooLarge(_) => 400,
            UploadError::Io(_) => 500,
        }
    }
}
