//! # Review Model
//!
//! Schema rules for the `reviews` collection. Each review belongs to
//! one tour and one user.

use serde_json::Value;

use super::errors::{ValidationError, ValidationResult};

/// Validate a document for review creation.
pub fn validate_new(doc: &Value) -> ValidationResult {
    let mut messages = Vec::new();

    match doc.get("review").and_then(Value::as_str) {
        None => messages.push("Review cannot be empty".to_string()),
        Some(text) if text.trim().is_empty() => {
            messages.push("Review cannot be empty".to_string())
        }
        Some(_) => {}
    }
    if doc.get("tour").and_then(Value::as_str).is_none() {
        messages.push("Review must belong to a tour".to_string());
    }
    if doc.get("user").and_then(Value::as_str).is_none() {
        messages.push("Review must belong to a user".to_string());
    }
    messages.extend(rating_messages(doc));

    ValidationError::from_messages(messages)
}

/// Validate a partial update: only the fields present are checked.
pub fn validate_update(doc: &Value) -> ValidationResult {
    let mut messages = Vec::new();

    if let Some(text) = doc.get("review") {
        if text.as_str().map(str::trim).unwrap_or("").is_empty() {
            messages.push("Review cannot be empty".to_string());
        }
    }
    messages.extend(rating_messages(doc));

    ValidationError::from_messages(messages)
}

fn rating_messages(doc: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    if let Some(rating) = doc.get("rating").and_then(Value::as_f64) {
        if rating < 1.0 {
            messages.push("Rating must be above 1.0".to_string());
        }
        if rating > 5.0 {
            messages.push("Rating must be below 5.0".to_string());
        }
    }

    messages
}

/// Apply creation defaults.
pub fn prepare(doc: &mut Value) {
    if let Some(obj) = doc.as_object_mut() {
        obj.entry("rating").or_insert_with(|| serde_json::json!(4.5));
    }
}
