//! # Tour Model
//!
//! Schema rules for the `tours` collection: required fields, length
//! and range constraints, the difficulty enum, discount-below-price
//! validation, slug generation and defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ValidationError, ValidationResult};

/// Maximum length of a tour name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Tour difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "difficult" => Some(Difficulty::Difficult),
            _ => None,
        }
    }
}

/// Validate a document for tour creation. Every required field must be
/// present and well-formed; messages accumulate so the client sees all
/// problems at once.
pub fn validate_new(doc: &Value) -> ValidationResult {
    let mut messages = Vec::new();

    match doc.get("name").and_then(Value::as_str) {
        None => messages.push("A tour must have a name".to_string()),
        Some(name) if name.trim().is_empty() => {
            messages.push("A tour must have a name".to_string())
        }
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => messages.push(format!(
            "A tour must have {} characters maximum",
            MAX_NAME_LENGTH
        )),
        Some(_) => {}
    }

    if doc.get("duration").and_then(Value::as_f64).is_none() {
        messages.push("A tour must have a duration".to_string());
    }
    if doc.get("max_group_size").and_then(Value::as_f64).is_none() {
        messages.push("A tour must have a group size".to_string());
    }
    match doc.get("difficulty").and_then(Value::as_str) {
        None => messages.push("A tour must have a difficulty level".to_string()),
        Some(raw) if Difficulty::parse(raw).is_none() => {
            messages.push("Difficulty is either easy, medium or difficult".to_string())
        }
        Some(_) => {}
    }
    if doc.get("price").and_then(Value::as_f64).is_none() {
        messages.push("A tour must have a price".to_string());
    }
    match doc.get("summary").and_then(Value::as_str) {
        None => messages.push("A tour must have a description".to_string()),
        Some(summary) if summary.trim().is_empty() => {
            messages.push("A tour must have a description".to_string())
        }
        Some(_) => {}
    }
    if doc.get("image_cover").and_then(Value::as_str).is_none() {
        messages.push("A tour must have a cover image".to_string());
    }

    messages.extend(optional_field_messages(doc));

    ValidationError::from_messages(messages)
}

/// Validate a partial update: only the fields present are checked.
pub fn validate_update(doc: &Value) -> ValidationResult {
    let mut messages = Vec::new();

    if let Some(name) = doc.get("name") {
        match name.as_str() {
            None => messages.push("A tour must have a name".to_string()),
            Some(name) if name.trim().is_empty() => {
                messages.push("A tour must have a name".to_string())
            }
            Some(name) if name.chars().count() > MAX_NAME_LENGTH => messages.push(format!(
                "A tour must have {} characters maximum",
                MAX_NAME_LENGTH
            )),
            Some(_) => {}
        }
    }
    if let Some(raw) = doc.get("difficulty") {
        if raw.as_str().and_then(Difficulty::parse).is_none() {
            messages.push("Difficulty is either easy, medium or difficult".to_string());
        }
    }

    messages.extend(optional_field_messages(doc));

    ValidationError::from_messages(messages)
}

/// Constraints on fields that are optional at creation time.
fn optional_field_messages(doc: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    if let Some(rating) = doc.get("ratings_average").and_then(Value::as_f64) {
        if rating < 1.0 {
            messages.push("Rating must be above 1.0".to_string());
        }
        if rating > 5.0 {
            messages.push("Rating must be below 5.0".to_string());
        }
    }

    if let Some(discount) = doc.get("price_discount").and_then(Value::as_f64) {
        let price = doc.get("price").and_then(Value::as_f64).unwrap_or(0.0);
        if discount >= price {
            messages.push(format!(
                "Discounted price {} should be less than actual price",
                discount
            ));
        }
    }

    messages
}

/// Apply creation defaults and derive the slug from the name.
pub fn prepare(doc: &mut Value) {
    let slug = doc
        .get("name")
        .and_then(Value::as_str)
        .map(slugify)
        .unwrap_or_default();

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("slug".to_string(), Value::String(slug));
        obj.entry("ratings_average")
            .or_insert_with(|| serde_json::json!(4.5));
        obj.entry("ratings_quantity").or_insert_with(|| serde_json::json!(0));
        obj.entry("secret_tour").or_insert(Value::Bool(false));
        obj.entry("images").or_insert_with(|| Value::Array(Vec::new()));
        obj.entry("start_dates")
            .or_insert_with(|| Value::Array(Vec::new()));
    }
}

/// URL-friendly slug: lowercase alphanumerics joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_tour() -> Value {
        json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "max_group_size": 25,
            "difficulty": "easy",
            "price": 397,
            "summary": "Breathtaking hike through the Canadian Banff National Park",
            "image_cover": "tour-1-cover.jpg"
        })
    }

    #[test]
    fn accepts_a_complete_tour() {
        assert!(validate_new(&valid_tour()).is_ok());
    }

    #[test]
    fn collects_all_missing_field_messages() {
        let err = validate_new(&json!({})).unwrap_err();
        assert_eq!(err.messages.len(), 7);
        assert!(err.to_string().contains("A tour must have a name"));
        assert!(err.to_string().contains("A tour must have a price"));
    }

    #[test]
    fn rejects_unknown_difficulty() {
        let mut tour = valid_tour();
        tour["difficulty"] = json!("extreme");

        let err = validate_new(&tour).unwrap_err();
        assert!(err
            .to_string()
            .contains("Difficulty is either easy, medium or difficult"));
    }

    #[test]
    fn rejects_overlong_name() {
        let mut tour = valid_tour();
        tour["name"] = json!("x".repeat(51));
        assert!(validate_new(&tour).is_err());
    }

    #[test]
    fn rejects_out_of_range_rating() {
        let mut tour = valid_tour();
        tour["ratings_average"] = json!(5.5);

        let err = validate_new(&tour).unwrap_err();
        assert!(err.to_string().contains("Rating must be below 5.0"));
    }

    #[test]
    fn rejects_discount_at_or_above_price() {
        let mut tour = valid_tour();
        tour["price_discount"] = json!(397);
        assert!(validate_new(&tour).is_err());

        tour["price_discount"] = json!(300);
        assert!(validate_new(&tour).is_ok());
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        assert!(validate_update(&json!({"price": 500})).is_ok());
        assert!(validate_update(&json!({"difficulty": "extreme"})).is_err());
        assert!(validate_update(&json!({"name": ""})).is_err());
    }

    #[test]
    fn prepare_stamps_slug_and_defaults() {
        let mut tour = valid_tour();
        prepare(&mut tour);

        assert_eq!(tour["slug"], json!("the-forest-hiker"));
        assert_eq!(tour["ratings_average"], json!(4.5));
        assert_eq!(tour["ratings_quantity"], json!(0));
        assert_eq!(tour["secret_tour"], json!(false));
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
        assert_eq!(slugify("Sea  &  Surf!"), "sea-surf");
        assert_eq!(slugify("  trailing  "), "trailing");
    }
}
