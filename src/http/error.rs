//! API Error Responses
//!
//! One error type for every handler. Bodies follow the
//! `{"status": "fail"|"error", "message": ..}` shape: `fail` for
//! client errors, `error` for server errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::observability::Logger;
use crate::services::ServiceError;
use crate::uploads::UploadError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Malformed request body or path parameter
    #[error("{0}")]
    BadRequest(String),

    /// Unmatched route
    #[error("Can't find {0} on this server!")]
    RouteNotFound(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Auth(e) => e.status_code(),
            ApiError::Service(e) => e.status_code(),
            ApiError::Upload(e) => e.status_code(),
            ApiError::BadRequest(_) => 400,
            ApiError::RouteNotFound(_) => 404,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let status = if code < 500 { "fail" } else { "error" };
        let message = self.to_string();

        if code >= 500 {
            Logger::error("REQUEST_FAILED", &[("message", &message)]);
        }

        let http_status =
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "status": status,
            "message": message,
        }));

        (http_status, body).into_response()
    }
}
