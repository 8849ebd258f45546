//! Tour HTTP Routes
//!
//! Tour CRUD, the top-5-cheap alias, the aggregation endpoints and the
//! nested review routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::auth::Role;

use super::error::ApiError;
use super::extract::{protect, restrict_to};
use super::response::{success, success_list};
use super::server::AppState;

pub fn tour_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_tours).post(create_tour))
        .route("/top-5-cheap", get(top_five_cheap))
        .route("/tour-stats", get(tour_stats))
        .route("/monthly-plan/:year", get(monthly_plan))
        .route(
            "/tours-within/:distance/center/:latlng/unit/:unit",
            get(tours_within),
        )
        .route("/:id", get(get_tour).patch(update_tour).delete(delete_tour))
        .route("/:tour_id/reviews", get(list_tour_reviews).post(create_tour_review))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_tours(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    protect(&state.auth, &headers)?;

    let tours = state.tours.list(&params)?;
    Ok(success_list("tours", tours))
}

/// Alias route: prefills the five cheapest best-rated tours.
async fn top_five_cheap(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    protect(&state.auth, &headers)?;

    let mut params = params;
    params.insert("limit".to_string(), "5".to_string());
    params.insert("sort".to_string(), "-ratings_average,price".to_string());
    params.insert(
        "fields".to_string(),
        "name,price,ratings_average,summary,difficulty".to_string(),
    );

    let tours = state.tours.list(&params)?;
    Ok(success_list("tours", tours))
}

async fn tour_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.tours.stats()?;
    Ok(success_list("stats", stats))
}

async fn monthly_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(year): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin, Role::LeadGuide, Role::Guide])?;

    let plan = state.tours.monthly_plan(year)?;
    Ok(success_list("plan", plan))
}

async fn tours_within(
    State(state): State<Arc<AppState>>,
    Path((distance, latlng, unit)): Path<(f64, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (lat, lng) = parse_latlng(&latlng)?;

    let tours = state.tours.within_radius(distance, lat, lng, &unit)?;
    Ok(success_list("tours", tours))
}

async fn get_tour(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tour = state.tours.get(&id)?;
    Ok(success("tour", tour))
}

async fn create_tour(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin, Role::LeadGuide])?;

    let tour = state.tours.create(body)?;
    Ok((StatusCode::CREATED, success("tour", tour)))
}

async fn update_tour(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin, Role::LeadGuide])?;

    let tour = state.tours.update(&id, body)?;
    Ok(success("tour", tour))
}

async fn delete_tour(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin, Role::LeadGuide])?;

    state.tours.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================
// Nested review routes
// ==================

async fn list_tour_reviews(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tour_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    protect(&state.auth, &headers)?;

    let reviews = state.reviews.list(Some(&tour_id), &params)?;
    Ok(success_list("reviews", reviews))
}

async fn create_tour_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tour_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::User])?;

    let review = state
        .reviews
        .create(Some(&tour_id), &user.id.to_string(), body)?;
    Ok((StatusCode::CREATED, success("review", review)))
}

fn parse_latlng(latlng: &str) -> Result<(f64, f64), ApiError> {
    let invalid = || {
        ApiError::BadRequest(
            "Please provide latitude and longitude in the format lat,lng".to_string(),
        )
    };

    let (lat, lng) = latlng.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    Ok((lat, lng))
}
