//! # Filter Conditions
//!
//! Typed filter AST for document queries. Each condition is a
//! `{field, operator, value}` triple; a query carries a list of
//! conditions combined with AND logic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators supported by the filter stage.
///
/// URL parsing only ever produces `Eq`, `Gt`, `Gte`, `Lt` and `Lte`;
/// `Ne` exists for internal query hooks (secret tours, soft-deleted
/// users).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "eq")]
    Eq,

    #[serde(rename = "ne")]
    Ne,

    #[serde(rename = "gt")]
    Gt,

    #[serde(rename = "gte")]
    Gte,

    #[serde(rename = "lt")]
    Lt,

    #[serde(rename = "lte")]
    Lte,
}

impl FilterOperator {
    /// Parse one of the four URL-facing comparison tokens.
    ///
    /// `eq` never appears in a bracketed key, and `ne` is internal
    /// only, so neither is recognized here.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
        }
    }
}

/// A single filter condition on a document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Ne, value)
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    /// Evaluate this condition against a document.
    ///
    /// A missing field fails every operator except `Ne`, which matches
    /// absent fields the way the database's `$ne` does.
    pub fn matches(&self, doc: &Value) -> bool {
        let field_value = match doc.get(&self.field) {
            Some(v) => v,
            None => return self.operator == FilterOperator::Ne,
        };

        match self.operator {
            FilterOperator::Eq => field_value == &self.value,
            FilterOperator::Ne => field_value != &self.value,
            FilterOperator::Gt => {
                compare_values(field_value, &self.value) == Some(Ordering::Greater)
            }
            FilterOperator::Gte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            FilterOperator::Lt => compare_values(field_value, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
        }
    }
}

/// Order two JSON values, where comparable.
///
/// Numbers compare numerically, strings lexicographically, booleans
/// false-before-true. Mixed or non-scalar types are incomparable and
/// yield `None`, which makes every range operator fail for them.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64()?;
            let b = b.as_f64()?;
            a.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
