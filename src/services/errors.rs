//! # Service Errors

use thiserror::Error;

use crate::models::ValidationError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Resource service errors
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// No document with the requested id
    #[error("No document found with the ID: {0}")]
    NotFound(String),

    /// Unique-field collision
    #[error("Duplicate key value: {value} for field: {field}. Please use another value!")]
    DuplicateField { field: String, value: String },

    /// Schema validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed path parameter (year, coordinates, unit)
    #[error("{0}")]
    BadParameter(String),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::DuplicateField { .. } => 400,
            ServiceError::Validation(_) => 400,
            ServiceError::BadParameter(_) => 400,
            ServiceError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ServiceError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(
            ServiceError::DuplicateField {
                field: "name".to_string(),
                value: "Forest Hiker".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(ServiceError::Store(StoreError::LockPoisoned).status_code(), 500);
    }

    #[test]
    fn duplicate_message_names_field_and_value() {
        let err = ServiceError::DuplicateField {
            field: "name".to_string(),
            value: "Forest Hiker".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate key value: Forest Hiker for field: name. Please use another value!"
        );
    }
}
