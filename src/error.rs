//! The error taxonomy every handler maps into.
//!
//! Each variant carries exactly one HTTP status, and every failure reaches
//! the client as a `{"message": "..."}` JSON body, including extractor
//! rejections (malformed JSON, bad path ids).

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input. 400.
    #[error("{0}")]
    Validation(String),
    /// Missing/invalid/expired token, or bad credentials. 401.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// Authenticated but not entitled to the resource. 403.
    #[error("{0}")]
    Forbidden(&'static str),
    /// Unknown resource; carries the resource name ("Product", "Order", ...). 404.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Duplicate email at signup. 409.
    #[error("Email already in use")]
    Conflict,
    /// Requested quantity exceeds current stock. 400.
    #[error("Insufficient product stock")]
    InsufficientStock,
    /// Unexpected store or crypto failure. Logged; clients see a generic 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientStock => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::Conflict,
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        AppError::Validation(errs.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejection is reported in the same `{message}`
/// shape as every other error.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Parses a path id, mapping failure to the taxonomy's 400.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {what} ID")))
}
