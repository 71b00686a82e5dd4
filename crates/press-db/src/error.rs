//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │     UNIQUE(orders.order_number) → retried by OrderRepository   │
//! │       ▼                                                                 │
//! │  ApiError (press-api) ← Serialized as { code, message }                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use press_core::{ServiceType, ValidationError};
use thiserror::Error;

/// The `table.column` SQLite names when two orders claim the same number.
pub const ORDER_NUMBER_CONSTRAINT: &str = "orders.order_number";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two concurrent checkouts proposing the same order number
    ///   (`field == "orders.order_number"`, retried, never surfaced)
    /// - Any other UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored rules blob failed to parse, validate, or match its service's
    /// type. The service cannot be priced until it is fixed.
    #[error("Invalid rules for service {service_id}: {reason}")]
    InvalidRules { service_id: String, reason: String },

    /// A stored service row's rules are for a different service type.
    #[error("Service {service_id} is {expected} but its rules are {found}")]
    RulesTypeMismatch {
        service_id: String,
        expected: ServiceType,
        found: ServiceType,
    },

    /// Input rejected before it reached SQL.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every order-number candidate was taken, or the allocation timed out.
    /// Nothing was persisted.
    #[error("Order number allocation failed after {attempts} attempts")]
    AllocationFailed { attempts: u32 },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether this is a UNIQUE violation on the given `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .trim()
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_matching() {
        let err = DbError::UniqueViolation {
            field: ORDER_NUMBER_CONSTRAINT.to_string(),
            value: "unknown".to_string(),
        };
        assert!(err.is_unique_violation_on(ORDER_NUMBER_CONSTRAINT));
        assert!(!err.is_unique_violation_on("orders.id"));
        assert!(!DbError::PoolExhausted.is_unique_violation_on(ORDER_NUMBER_CONSTRAINT));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::AllocationFailed { attempts: 5 }.to_string(),
            "Order number allocation failed after 5 attempts"
        );
        assert_eq!(
            DbError::not_found("Order", "abc").to_string(),
            "Order not found: abc"
        );
    }
}
