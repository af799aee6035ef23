use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use thiserror::Error;

use wedding_shared::store::StoreError;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn bad_request(message: String) -> Self {
        AppError::BadRequest(message)
    }

    pub fn unauthorized(message: String) -> Self {
        AppError::Unauthorized(message)
    }

    pub fn not_found(message: String) -> Self {
        AppError::NotFound(message)
    }

    pub fn internal_server_error(message: String) -> Self {
        AppError::InternalServerError(message)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            // Mutations against a missing identifier keep reporting as a
            // server error; the public contract only distinguishes
            // 400/401/5xx.
            AppError::NotFound(message) => {
                error!("Record not found: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::InternalServerError(message) => {
                error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
