//! # Query Specification
//!
//! The immutable description of a pending read: filter conditions,
//! sort keys, field projection and pagination bounds. Pipeline stages
//! build new specifications instead of mutating shared state; the
//! finished specification is handed to the store once for execution.

use serde_json::Value;

use super::filter::FilterCondition;

/// A single sort key. `-field` in the URL maps to `descending: true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Which fields of a document are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Return every field except the listed ones.
    Exclude(Vec<String>),

    /// Return only the listed fields. The `id` field is always kept.
    Include(Vec<String>),
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Exclude(Vec::new())
    }
}

impl Projection {
    /// Apply this projection to a document, returning the trimmed copy.
    ///
    /// Requesting a field that does not exist is not an error; it is
    /// simply absent from the result.
    pub fn apply(&self, doc: &Value) -> Value {
        let obj = match doc.as_object() {
            Some(obj) => obj,
            None => return doc.clone(),
        };

        match self {
            Projection::Exclude(fields) => {
                if fields.is_empty() {
                    return doc.clone();
                }
                let kept = obj
                    .iter()
                    .filter(|(k, _)| !fields.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Value::Object(kept)
            }
            Projection::Include(fields) => {
                let kept = obj
                    .iter()
                    .filter(|(k, _)| *k == "id" || fields.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Value::Object(kept)
            }
        }
    }
}

/// The composed specification of an unexecuted read.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Filter conditions, combined with AND.
    pub conditions: Vec<FilterCondition>,

    /// Sort keys, applied in order.
    pub sort: Vec<SortKey>,

    /// Field projection.
    pub projection: Projection,

    /// Records to skip before collecting results.
    pub skip: usize,

    /// Maximum records to return (None = unbounded).
    pub limit: Option<usize>,
}

/// An unexecuted read against a named collection.
///
/// Chainable in the builder style the handlers use; each call folds
/// into the underlying [`QuerySpec`]. Execution is deferred until the
/// store is asked to run it.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub spec: QuerySpec,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            spec: QuerySpec::default(),
        }
    }

    /// Narrow the query by additional filter conditions.
    pub fn find(mut self, conditions: Vec<FilterCondition>) -> Self {
        self.spec.conditions.extend(conditions);
        self
    }

    /// Replace the sort order.
    pub fn sort(mut self, keys: Vec<SortKey>) -> Self {
        self.spec.sort = keys;
        self
    }

    /// Replace the field projection.
    pub fn select(mut self, projection: Projection) -> Self {
        self.spec.projection = projection;
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.spec.skip = n;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.spec.limit = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::FilterCondition;
    use serde_json::json;

    #[test]
    fn exclude_projection_drops_listed_fields() {
        let proj = Projection::Exclude(vec!["__v".to_string()]);
        let doc = json!({"id": "1", "name": "Forest Hiker", "__v": 0});

        let out = proj.apply(&doc);
        assert_eq!(out, json!({"id": "1", "name": "Forest Hiker"}));
    }

    #[test]
    fn include_projection_keeps_id_and_listed_fields() {
        let proj = Projection::Include(vec!["name".to_string(), "price".to_string()]);
        let doc = json!({"id": "1", "name": "Forest Hiker", "price": 397, "summary": "..."});

        let out = proj.apply(&doc);
        assert_eq!(out, json!({"id": "1", "name": "Forest Hiker", "price": 397}));
    }

    #[test]
    fn include_projection_ignores_unknown_fields() {
        let proj = Projection::Include(vec!["nonexistent".to_string()]);
        let doc = json!({"id": "1", "name": "Forest Hiker"});

        let out = proj.apply(&doc);
        assert_eq!(out, json!({"id": "1"}));
    }

    #[test]
    fn default_projection_returns_everything() {
        let doc = json!({"id": "1", "__v": 3});
        assert_eq!(Projection::default().apply(&doc), doc);
    }

    #[test]
    fn query_builder_folds_into_spec() {
        let query = Query::collection("tours")
            .find(vec![FilterCondition::eq("difficulty", json!("easy"))])
            .find(vec![FilterCondition::gte("price", json!(100))])
            .sort(vec![SortKey::desc("price")])
            .skip(40)
            .limit(20);

        assert_eq!(query.collection, "tours");
        assert_eq!(query.spec.conditions.len(), 2);
        assert_eq!(query.spec.sort, vec![SortKey::desc("price")]);
        assert_eq!(query.spec.skip, 40);
        assert_eq!(query.spec.limit, Some(20));
    }
}
