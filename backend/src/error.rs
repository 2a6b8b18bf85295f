//! Error handling for the Estoque platform
//!
//! Every failure leaving a handler is rendered as `{ "error", "code" }`,
//! with `"field"` added for validation failures.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::services::movement::MovementError;
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business rule errors
    #[error("Referenced {0} does not exist")]
    MissingReference(String),

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("{0} still has movements")]
    HasMovements(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.to_string(),
            field: None,
        }
    }
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::InactiveUser
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. }
            | AppError::InvalidInput(_)
            | AppError::MalformedBody(_)
            | AppError::MissingReference(_)
            | AppError::InsufficientStock { .. }
            | AppError::HasMovements(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::InvalidCredentials => {
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid email or password")
            }
            AppError::InactiveUser => ErrorResponse::new("INACTIVE_USER", "User account is inactive"),
            AppError::TokenExpired => ErrorResponse::new("TOKEN_EXPIRED", "Token has expired"),
            AppError::InvalidToken => ErrorResponse::new("INVALID_TOKEN", "Invalid token"),
            AppError::Unauthorized(msg) => ErrorResponse::new("UNAUTHORIZED", msg.clone()),
            AppError::Validation { field, message } => ErrorResponse {
                field: Some(field.clone()),
                ..ErrorResponse::new("VALIDATION_ERROR", message.clone())
            },
            AppError::InvalidInput(msg) => ErrorResponse::new("INVALID_INPUT", msg.clone()),
            AppError::MalformedBody(msg) => ErrorResponse::new("MALFORMED_BODY", msg.clone()),
            AppError::DuplicateEntry(field) => ErrorResponse {
                field: Some(field.clone()),
                ..ErrorResponse::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
            },
            AppError::NotFound(resource) => {
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::MissingReference(entity) => {
                ErrorResponse::new("NOT_FOUND", format!("{} not found", entity))
            }
            AppError::InsufficientStock {
                available,
                requested,
            } => ErrorResponse::new(
                "INSUFFICIENT_STOCK",
                format!(
                    "Insufficient stock: {} available, {} requested",
                    available, requested
                ),
            ),
            AppError::HasMovements(resource) => ErrorResponse::new(
                "HAS_MOVEMENTS",
                format!("{} cannot be deleted because it has movements", resource),
            ),
            AppError::DatabaseError(_) => {
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
            }
            AppError::Internal(_) | AppError::InternalError(_) => {
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            });

        match first {
            Some((field, message)) => AppError::Validation { field, message },
            None => AppError::InvalidInput(errors.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::DatabaseError(e),
            StoreError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        match err {
            MovementError::InvalidInput(msg) => AppError::InvalidInput(msg),
            MovementError::NotFound(entity) => AppError::MissingReference(entity.to_string()),
            MovementError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                available,
                requested,
            },
            MovementError::Persistence(e) => e.into(),
        }
    }
}

/// Map a unique-constraint violation to `DuplicateEntry`, anything else to a database error
pub fn map_unique_violation(err: sqlx::Error, field: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateEntry(field.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::movement::Entity;

    #[test]
    fn engine_errors_map_to_bad_request() {
        let cases = [
            MovementError::InvalidInput("quantity must be positive".into()),
            MovementError::NotFound(Entity::Product),
            MovementError::NotFound(Entity::User),
            MovementError::InsufficientStock {
                available: 2,
                requested: 5,
            },
        ];
        for case in cases {
            assert_eq!(AppError::from(case).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn persistence_failure_is_opaque_500() {
        let err = AppError::from(MovementError::Persistence(StoreError::Unavailable(
            "commit failed: connection reset".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.body();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.error.contains("connection reset"));
    }

    #[test]
    fn crud_lookups_use_404_and_duplicates_409() {
        assert_eq!(
            AppError::NotFound("Product".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DuplicateEntry("email".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::HasMovements("User".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn validation_body_carries_field() {
        let body = AppError::Validation {
            field: "email".into(),
            message: "Invalid email format".into(),
        }
        .body();

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Invalid email format");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field"], "email");
    }

    #[test]
    fn field_is_omitted_when_absent() {
        let json = serde_json::to_value(AppError::InvalidToken.body()).unwrap();
        assert!(json.get("field").is_none());
    }
}
