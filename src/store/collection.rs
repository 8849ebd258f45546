//! # Collections
//!
//! In-memory collection map with deferred query execution. Documents
//! are JSON objects stamped on insert with a UUID `id`, a `created_at`
//! timestamp and a `__v` revision counter; updates merge fields and
//! bump the revision.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::query::filter::{compare_values, FilterCondition};
use crate::query::{Query, SortKey};

use super::errors::{StoreError, StoreResult};

/// Thread-safe document store.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, stamping `id`, `created_at` and `__v`.
    ///
    /// A caller-supplied `id` is kept, which lets seed imports carry
    /// stable identifiers.
    pub fn insert(&self, collection: &str, mut doc: Value) -> StoreResult<Value> {
        let obj = doc.as_object_mut().ok_or(StoreError::NotAnObject)?;

        obj.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        obj.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        obj.insert("__v".to_string(), Value::Number(0.into()));

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        Ok(doc)
    }

    /// Execute a composed query: filter, sort, skip/limit, project.
    pub fn execute(&self, query: &Query) -> StoreResult<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;

        let records = collections
            .get(&query.collection)
            .map(|v| v.as_slice())
            .unwrap_or_default();

        let mut matched: Vec<Value> = records
            .iter()
            .filter(|doc| query.spec.conditions.iter().all(|c| c.matches(doc)))
            .cloned()
            .collect();

        sort_documents(&mut matched, &query.spec.sort);

        let page: Vec<Value> = matched
            .into_iter()
            .skip(query.spec.skip)
            .take(query.spec.limit.unwrap_or(usize::MAX))
            .map(|doc| query.spec.projection.apply(&doc))
            .collect();

        Ok(page)
    }

    /// Find one document matching all conditions, unprojected.
    pub fn find_one(
        &self,
        collection: &str,
        conditions: &[FilterCondition],
    ) -> StoreResult<Option<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;

        Ok(collections
            .get(collection)
            .and_then(|records| {
                records
                    .iter()
                    .find(|doc| conditions.iter().all(|c| c.matches(doc)))
            })
            .cloned())
    }

    pub fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.find_one(
            collection,
            &[FilterCondition::eq("id", Value::String(id.to_string()))],
        )
    }

    /// Merge `updates` into the document with the given id, bumping
    /// `__v`. Returns the updated document, or None if absent.
    pub fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        updates: Value,
    ) -> StoreResult<Option<Value>> {
        let updates_obj = match updates.as_object() {
            Some(obj) => obj.clone(),
            None => return Err(StoreError::NotAnObject),
        };

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;

        let records = match collections.get_mut(collection) {
            Some(records) => records,
            None => return Ok(None),
        };

        let doc = records
            .iter_mut()
            .find(|doc| doc.get("id").and_then(Value::as_str) == Some(id));

        Ok(doc.map(|doc| {
            if let Some(obj) = doc.as_object_mut() {
                for (key, value) in updates_obj {
                    if key != "id" && key != "__v" {
                        obj.insert(key, value);
                    }
                }
                let revision = obj.get("__v").and_then(Value::as_i64).unwrap_or(0);
                obj.insert("__v".to_string(), Value::Number((revision + 1).into()));
            }
            doc.clone()
        }))
    }

    /// Delete the document with the given id. Returns whether a
    /// document was removed.
    pub fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;

        let records = match collections.get_mut(collection) {
            Some(records) => records,
            None => return Ok(false),
        };

        let before = records.len();
        records.retain(|doc| doc.get("id").and_then(Value::as_str) != Some(id));
        Ok(records.len() < before)
    }

    /// Count documents matching all conditions.
    pub fn count(&self, collection: &str, conditions: &[FilterCondition]) -> StoreResult<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;

        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|doc| conditions.iter().all(|c| c.matches(doc)))
                    .count()
            })
            .unwrap_or(0))
    }
}

/// Stable multi-key sort. Incomparable or missing values compare
/// equal, so they keep their insertion order.
fn sort_documents(docs: &mut [Value], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }

    docs.sort_by(|a, b| {
        for key in keys {
            let ord = match (a.get(&key.field), b.get(&key.field)) {
                (Some(av), Some(bv)) => compare_values(av, bv).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}
