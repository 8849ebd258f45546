//! # Review Service
//!
//! Review CRUD. The nested tour route scopes lists to one tour; review
//! creation fills the tour and author fields from the route and the
//! logged-in user when the body omits them.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::review;
use crate::query::{FilterCondition, Query, QueryPipeline};
use crate::store::DocumentStore;

use super::errors::{ServiceError, ServiceResult};

/// Collection name for reviews.
pub const COLLECTION: &str = "reviews";

pub struct ReviewService {
    store: Arc<DocumentStore>,
}

impl ReviewService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// List reviews, optionally scoped to one tour.
    pub fn list(
        &self,
        tour_id: Option<&str>,
        params: &HashMap<String, String>,
    ) -> ServiceResult<Vec<Value>> {
        let mut query = Query::collection(COLLECTION);
        if let Some(tour_id) = tour_id {
            query = query.find(vec![FilterCondition::eq("tour", json!(tour_id))]);
        }

        let query = QueryPipeline::new(query, params)
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .into_query();

        Ok(self.store.execute(&query)?)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Value> {
        let mut doc = self
            .store
            .find_by_id(COLLECTION, id)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        if let Some(obj) = doc.as_object_mut() {
            obj.remove("__v");
        }
        Ok(doc)
    }

    /// Create a review. `tour_id` and `user_id` fill in missing body
    /// fields, so the nested route works without repeating them.
    pub fn create(
        &self,
        tour_id: Option<&str>,
        user_id: &str,
        mut doc: Value,
    ) -> ServiceResult<Value> {
        if let Some(obj) = doc.as_object_mut() {
            if let Some(tour_id) = tour_id {
                obj.entry("tour".to_string())
                    .or_insert_with(|| json!(tour_id));
            }
            obj.entry("user".to_string())
                .or_insert_with(|| json!(user_id));
        }

        review::validate_new(&doc)?;
        review::prepare(&mut doc);
        Ok(self.store.insert(COLLECTION, doc)?)
    }

    pub fn update(&self, id: &str, updates: Value) -> ServiceResult<Value> {
        review::validate_update(&updates)?;

        self.store
            .update_by_id(COLLECTION, id, updates)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        if self.store.delete_by_id(COLLECTION, id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id.to_string()))
        }
    }
}
