//! User HTTP Routes
//!
//! Signup, login, the password reset flow, self-service profile
//! management (including photo upload) and the admin-only user CRUD.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{AuthError, Role, User};
use crate::observability::{log_event, Event};
use crate::services::ServiceError;

use super::error::ApiError;
use super::extract::{protect, restrict_to};
use super::response::{success, success_list, success_with_token};
use super::server::AppState;

pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgotPassword", post(forgot_password))
        .route("/resetPassword/:token", patch(reset_password))
        .route("/updateMyPassword", patch(update_my_password))
        .route("/me", get(get_me))
        .route("/updateMe", patch(update_me))
        .route("/updateMyPhoto", patch(update_my_photo))
        .route("/deleteMe", delete(delete_me))
        .route("/", get(list_users))
        .route("/:id", get(get_user).delete(delete_user))
        .with_state(state)
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
struct ForgotPasswordRequest {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordRequest {
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
struct UpdatePasswordRequest {
    current_password: String,
    password: String,
    confirm_password: String,
}

fn user_json(user: &User) -> Value {
    serde_json::to_value(user).unwrap_or(Value::Null)
}

// ==================
// Auth Handlers
// ==================

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<crate::auth::SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.auth.signup(request)?;
    log_event(Event::AuthSuccess, &[("flow", "signup"), ("user", &user.email)]);

    Ok((StatusCode::CREATED, success_with_token(&token, user_json(&user))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<crate::auth::LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.auth.login(request)?;
    log_event(Event::AuthSuccess, &[("flow", "login"), ("user", &user.email)]);

    Ok(success_with_token(&token, user_json(&user)))
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .auth
        .forgot_password(&request.email, &state.config.base_url);
    if let Err(AuthError::EmailSendFailed) = &result {
        log_event(Event::ResetEmailFailed, &[("user", &request.email)]);
    }
    result?;
    log_event(Event::ResetEmailSent, &[("user", &request.email)]);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Token sent to email!",
    })))
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, jwt) =
        state
            .auth
            .reset_password(&token, &request.password, &request.confirm_password)?;

    Ok(success_with_token(&jwt, user_json(&user)))
}

async fn update_my_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;

    let (user, jwt) = state.auth.update_password(
        user.id,
        &request.current_password,
        &request.password,
        &request.confirm_password,
    )?;

    Ok(success_with_token(&jwt, user_json(&user)))
}

// ==================
// Self-service Handlers
// ==================

async fn get_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    Ok(success("user", user_json(&user)))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;

    let updated = state.auth.update_me(user.id, &body)?;
    Ok(success("user", user_json(&updated)))
}

async fn update_my_photo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let original_name = field.file_name().unwrap_or("photo").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let filename =
            state
                .uploads
                .save_user_photo(user.id, &content_type, &original_name, &data)?;
        let updated = state.auth.set_photo(user.id, &filename)?;

        return Ok(success("user", user_json(&updated)));
    }

    Err(ApiError::BadRequest(
        "Please provide a photo field".to_string(),
    ))
}

async fn delete_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;

    state.auth.deactivate(user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================
// Admin Handlers
// ==================

async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin])?;

    let users = state.auth.list_users()?;
    Ok(success_list(
        "users",
        users.iter().map(user_json).collect(),
    ))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin])?;

    let found = state
        .auth
        .get_user(id)?
        .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
    Ok(success("user", user_json(&found)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = protect(&state.auth, &headers)?;
    restrict_to(&user, &[Role::Admin])?;

    state.auth.delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}
