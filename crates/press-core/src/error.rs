//! # Error Types
//!
//! Domain-specific error types for press-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  press-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing, checkout, order-number failures       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  press-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  press-api errors (in app)                                             │
//! │  └── ApiError         - What the order-entry UI sees (serialized)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, service id, attempts)
//! 3. Errors are enum variants, never String
//! 4. A missing rule-table key is NOT an error (see `pricing::RuleLookupMiss`)

use thiserror::Error;

use crate::types::ServiceType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The specification failed validation.
    ///
    /// ## When This Occurs
    /// - Non-positive tarpaulin dimension, copies or quantity
    /// - Negative eyelet count
    /// - Page analysis whose color and black pages don't add up
    ///
    /// Always raised before any price is computed or anything is persisted.
    #[error("Invalid specification: {0}")]
    InvalidSpecification(#[from] ValidationError),

    /// A rule set of one service type was paired with a specification of
    /// another (e.g. tarpaulin rules for a document).
    #[error("Rule set mismatch: expected {expected} rules, got {found}")]
    RuleSetMismatch {
        expected: ServiceType,
        found: ServiceType,
    },

    /// A rule set failed load-time validation.
    #[error("Invalid {service_type} rule set: {reason}")]
    InvalidRuleSet {
        service_type: ServiceType,
        reason: String,
    },

    /// Shop-wide pricing configuration could not be parsed.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    /// Every planned order-number candidate collided.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout ──► ORD-250114-0004        (exists)
    ///          ──► ORD-250114-0004-317    (exists)
    ///          ──► ...                    (max attempts)
    ///          ──► OrderNumberAllocationFailed
    ///                   │
    ///                   ▼
    ///          Nothing persisted; cashier may retry checkout
    /// ```
    #[error("Order number allocation failed after {attempts} attempts")]
    OrderNumberAllocationFailed { attempts: u32 },

    /// A string is not of the form `ORD-YYMMDD-NNNN[-RRR]`.
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    /// A submitted cart figure disagrees with the server's recomputation.
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    CheckoutMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },

    /// Checkout with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A cart line or quote names a service that is not in the catalog.
    #[error("Service not found: {0}")]
    UnknownService(String),

    /// Money arithmetic left the i64 range.
    #[error("Arithmetic overflow computing {0}")]
    Overflow(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, NaN dimension).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RuleSetMismatch {
            expected: ServiceType::Document,
            found: ServiceType::Tarpaulin,
        };
        assert_eq!(
            err.to_string(),
            "Rule set mismatch: expected document rules, got tarpaulin"
        );

        let err = CoreError::OrderNumberAllocationFailed { attempts: 5 };
        assert_eq!(
            err.to_string(),
            "Order number allocation failed after 5 attempts"
        );

        let err = CoreError::CheckoutMismatch {
            field: "total".to_string(),
            expected: 41000,
            actual: 40000,
        };
        assert_eq!(
            err.to_string(),
            "total mismatch: expected 41000, got 40000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "widthFt".to_string(),
        };
        assert_eq!(err.to_string(), "widthFt must be positive");
        assert_eq!(err.field(), "widthFt");

        let err = ValidationError::MustNotBeNegative {
            field: "eyelets".to_string(),
        };
        assert_eq!(err.to_string(), "eyelets must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "colorMode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidSpecification(_)));
        assert_eq!(
            core_err.to_string(),
            "Invalid specification: colorMode is required"
        );
    }
}
