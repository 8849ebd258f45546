//! # Validation Errors

use thiserror::Error;

/// Result type for model validation
pub type ValidationResult = Result<(), ValidationError>;

/// One or more field-level validation failures, joined into a single
/// client-facing message.
#[derive(Debug, Clone, Error)]
#[error("Invalid input data. {}", messages.join(". "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Build a result from collected messages: Ok when empty.
    pub fn from_messages(messages: Vec<String>) -> ValidationResult {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self { messages })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_messages_into_one_line() {
        let err = ValidationError {
            messages: vec![
                "A tour must have a name".to_string(),
                "A tour must have a price".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid input data. A tour must have a name. A tour must have a price"
        );
    }

    #[test]
    fn empty_message_list_is_ok() {
        assert!(ValidationError::from_messages(Vec::new()).is_ok());
    }
}
