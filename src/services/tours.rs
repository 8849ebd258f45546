//! # Tour Service
//!
//! Tour CRUD and aggregations. Every list-style read carries the
//! secret-tour hook (`secret_tour ne true`) so unpublished tours never
//! leak through filters, stats or the radius search.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::models::tour;
use crate::query::{FilterCondition, Projection, Query, QueryPipeline};
use crate::store::DocumentStore;

use super::errors::{ServiceError, ServiceResult};

/// Collection name for tours.
pub const COLLECTION: &str = "tours";

/// Mean Earth radius per distance unit, for the radius search.
const EARTH_RADIUS_MILES: f64 = 3963.2;
const EARTH_RADIUS_KM: f64 = 6378.1;

pub struct TourService {
    store: Arc<DocumentStore>,
}

impl TourService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    fn base_query(&self) -> Query {
        Query::collection(COLLECTION).find(vec![FilterCondition::ne("secret_tour", json!(true))])
    }

    /// List tours through the query pipeline.
    pub fn list(&self, params: &HashMap<String, String>) -> ServiceResult<Vec<Value>> {
        let query = QueryPipeline::new(self.base_query(), params)
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .into_query();

        Ok(self.store.execute(&query)?)
    }

    /// Fetch one tour with its reviews populated.
    pub fn get(&self, id: &str) -> ServiceResult<Value> {
        let mut doc = self
            .store
            .find_by_id(COLLECTION, id)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        let reviews_query = Query::collection(super::reviews::COLLECTION)
            .find(vec![FilterCondition::eq("tour", json!(id))])
            .select(Projection::Exclude(vec!["__v".to_string()]));
        let reviews = self.store.execute(&reviews_query)?;

        if let Some(obj) = doc.as_object_mut() {
            obj.remove("__v");
            obj.insert("reviews".to_string(), Value::Array(reviews));
        }

        Ok(doc)
    }

    /// Create a tour after validating and defaulting the document.
    pub fn create(&self, mut doc: Value) -> ServiceResult<Value> {
        tour::validate_new(&doc)?;

        if let Some(name) = doc.get("name").and_then(Value::as_str) {
            let clash = self
                .store
                .find_one(COLLECTION, &[FilterCondition::eq("name", json!(name))])?;
            if clash.is_some() {
                return Err(ServiceError::DuplicateField {
                    field: "name".to_string(),
                    value: name.to_string(),
                });
            }
        }

        tour::prepare(&mut doc);
        Ok(self.store.insert(COLLECTION, doc)?)
    }

    /// Partial update; the slug follows a renamed tour.
    pub fn update(&self, id: &str, mut updates: Value) -> ServiceResult<Value> {
        tour::validate_update(&updates)?;

        if let Some(name) = updates.get("name").and_then(Value::as_str) {
            let slug = tour::slugify(name);
            if let Some(obj) = updates.as_object_mut() {
                obj.insert("slug".to_string(), Value::String(slug));
            }
        }

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

    /// Per-difficulty statistics over well-rated tours, ordered by
    /// average price ascending.
    pub fn stats(&self) -> ServiceResult<Vec<Value>> {
        let query = self
            .base_query()
            .find(vec![FilterCondition::gte("ratings_average", json!(4.5))]);
        let tours = self.store.execute(&query)?;

        let mut groups: BTreeMap<String, DifficultyStats> = BTreeMap::new();
        for tour in &tours {
            let difficulty = tour
                .get("difficulty")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let entry = groups.entry(difficulty).or_default();
            entry.num_tours += 1;
            entry.num_ratings += tour
                .get("ratings_quantity")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            entry.rating_sum += tour
                .get("ratings_average")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let price = tour.get("price").and_then(Value::as_f64).unwrap_or(0.0);
            entry.price_sum += price;
            entry.min_price = entry.min_price.min(price);
            entry.max_price = entry.max_price.max(price);
        }

        let mut stats: Vec<Value> = groups
            .into_iter()
            .map(|(difficulty, s)| {
                let n = s.num_tours as f64;
                json!({
                    "difficulty": difficulty,
                    "num_tours": s.num_tours,
                    "num_ratings": s.num_ratings,
                    "avg_rating": s.rating_sum / n,
                    "avg_price": s.price_sum / n,
                    "min_price": s.min_price,
                    "max_price": s.max_price,
                })
            })
            .collect();

        stats.sort_by(|a, b| {
            let av = a["avg_price"].as_f64().unwrap_or(0.0);
            let bv = b["avg_price"].as_f64().unwrap_or(0.0);
            av.partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(stats)
    }

    /// Busiest-month plan for a year: unwind start dates, group by
    /// month, order by tour starts descending.
    pub fn monthly_plan(&self, year: i32) -> ServiceResult<Vec<Value>> {
        let tours = self.store.execute(&self.base_query())?;

        let mut months: BTreeMap<u32, (u64, Vec<String>)> = BTreeMap::new();
        for tour in &tours {
            let name = tour.get("name").and_then(Value::as_str).unwrap_or("");
            let dates = tour
                .get("start_dates")
                .and_then(Value::as_array)
                .map(|a| a.as_slice())
                .unwrap_or_default();

            for date in dates {
                let Some(raw) = date.as_str() else { continue };
                if let Some((y, month)) = parse_start_date(raw) {
                    if y == year {
                        let entry = months.entry(month).or_default();
                        entry.0 += 1;
                        entry.1.push(name.to_string());
                    }
                }
            }
        }

        let mut plan: Vec<Value> = months
            .into_iter()
            .map(|(month, (num_tour_starts, tours))| {
                json!({
                    "month": month,
                    "num_tour_starts": num_tour_starts,
                    "tours": tours,
                })
            })
            .collect();

        plan.sort_by(|a, b| {
            let av = a["num_tour_starts"].as_u64().unwrap_or(0);
            let bv = b["num_tour_starts"].as_u64().unwrap_or(0);
            bv.cmp(&av)
        });

        Ok(plan)
    }

    /// Tours whose start location lies within `distance` of the center
    /// point. `unit` is `mi` or `km`.
    pub fn within_radius(
        &self,
        distance: f64,
        lat: f64,
        lng: f64,
        unit: &str,
    ) -> ServiceResult<Vec<Value>> {
        let radius = match unit {
            "mi" => EARTH_RADIUS_MILES,
            "km" => EARTH_RADIUS_KM,
            _ => {
                return Err(ServiceError::BadParameter(
                    "Unit must be mi or km".to_string(),
                ))
            }
        };

        let tours = self.store.execute(&self.base_query())?;

        Ok(tours
            .into_iter()
            .filter(|tour| {
                let location = tour.get("start_location");
                let tour_lat = location
                    .and_then(|l| l.get("lat"))
                    .and_then(Value::as_f64);
                let tour_lng = location
                    .and_then(|l| l.get("lng"))
                    .and_then(Value::as_f64);

                match (tour_lat, tour_lng) {
                    (Some(tlat), Some(tlng)) => {
                        haversine(lat, lng, tlat, tlng, radius) <= distance
                    }
                    _ => false,
                }
            })
            .collect())
    }
}

#[derive(Debug)]
struct DifficultyStats {
    num_tours: u64,
    num_ratings: f64,
    rating_sum: f64,
    price_sum: f64,
    min_price: f64,
    max_price: f64,
}

impl Default for DifficultyStats {
    fn default() -> Self {
        Self {
            num_tours: 0,
            num_ratings: 0.0,
            rating_sum: 0.0,
            price_sum: 0.0,
            min_price: f64::INFINITY,
            max_price: f64::NEG_INFINITY,
        }
    }
}

/// Great-circle distance between two points, in the unit of `radius`.
fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64, radius: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * a.sqrt().asin() * radius
}

/// Accepts RFC 3339, `YYYY-MM-DD` and the seed data's
/// `YYYY-MM-DD,HH:MM` shape.
fn parse_start_date(raw: &str) -> Option<(i32, u32)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.year(), dt.month()));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some((d.year(), d.month()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d,%H:%M") {
        return Some((dt.year(), dt.month()));
    }
    None
}
