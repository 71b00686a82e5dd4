//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PrintPress                             │
//! │                                                                         │
//! │  Handler -> Result<T, ApiError>                                        │
//! │       │                                                                 │
//! │       ├── JsonRejection        ──► 400 VALIDATION_ERROR                │
//! │       ├── CoreError            ──► 400 / 404 (unknown service)         │
//! │       ├── DbError              ──► 500 DATABASE_ERROR                  │
//! │       └── AllocationFailed     ──► 503 ORDER_NUMBER_ALLOCATION_FAILED  │
//! │                                                                         │
//! │  Body: { "code": "VALIDATION_ERROR", "message": "copies must be ..." } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use press_core::{CoreError, ValidationError};
use press_db::DbError;

/// Error body returned by every failing request.
///
/// ```json
/// {
///   "code": "CHECKOUT_MISMATCH",
///   "message": "total mismatch: expected 41000, got 40000"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Submitted figures disagree with the server's pricing (400)
    CheckoutMismatch,

    /// No order number could be claimed; safe to retry (503)
    OrderNumberAllocationFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::CheckoutMismatch => StatusCode::BAD_REQUEST,
            ErrorCode::OrderNumberAllocationFailed => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }

        (status, Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            DbError::AllocationFailed { attempts } => ApiError::new(
                ErrorCode::OrderNumberAllocationFailed,
                format!(
                    "Could not allocate an order number after {} attempts, please retry",
                    attempts
                ),
            ),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::InvalidRules { service_id, reason } => {
                // Log the actual error but return a generic message
                tracing::error!(
                    service_id = %service_id,
                    reason = %reason,
                    "Stored rules are unusable"
                );
                ApiError::internal(format!("Service {} is misconfigured", service_id))
            }
            DbError::RulesTypeMismatch { service_id, .. } => {
                tracing::error!(
                    service_id = %service_id,
                    "Stored rules have the wrong service type"
                );
                ApiError::internal(format!("Service {} is misconfigured", service_id))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownService(id) => ApiError::not_found("Service", &id),
            CoreError::CheckoutMismatch { .. } => {
                ApiError::new(ErrorCode::CheckoutMismatch, err.to_string())
            }
            CoreError::OrderNumberAllocationFailed { .. } => {
                ApiError::new(ErrorCode::OrderNumberAllocationFailed, err.to_string())
            }
            CoreError::InvalidSpecification(e) => ApiError::validation(e.to_string()),
            CoreError::RuleSetMismatch { .. }
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::InvalidOrderNumber(_) => ApiError::validation(err.to_string()),
            CoreError::InvalidRuleSet { .. } | CoreError::InvalidConfig(_) => {
                ApiError::internal(err.to_string())
            }
            CoreError::Overflow(_) => ApiError::validation(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed bodies and specifications that fail to deserialize (missing
/// `colorMode`, unknown `serviceType`, ...) are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Type alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;
