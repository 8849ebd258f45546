//! Review HTTP Routes
//!
//! Flat review endpoints; the tour-scoped variants live on the tour
//! router. Writing reviews is a regular-user action, moderation
//! belongs to users and admins.

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

pub fn review_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/:id",
            get(get_review).patch(update_review).delete(delete_review),
        )
        .with_state(state)
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    protect(&state.auth, &headers)?;

    let reviews = state.reviews.list(None, &params)?;
    Ok(success_list("reviews", reviews))
}

async fn get_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    protect(&state.auth, &headers)?;

    let review = state.reviews.get(&id)?;
    Ok(success("review", review))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::User])?;

    let review = state.reviews.create(None, &user.id.to_string(), body)?;
    Ok((StatusCode::CREATED, success("review", review)))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::User, Role::Admin])?;

    let review = state.reviews.update(&id, body)?;
    Ok(success("review", review))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::User, Role::Admin])?;

    state.reviews.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
