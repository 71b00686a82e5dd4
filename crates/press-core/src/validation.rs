//! # Validation Module
//!
//! Field-level validators for specifications and checkout input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Order-entry UI                                               │
//! │  └── Immediate feedback on the spec form                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: press-api (serde)                                            │
//! │  ├── Closed enums: colorMode, lamination size, serviceType             │
//! │  └── Missing required fields rejected at deserialization               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── Ranges: copies, quantity, eyelets, dimensions                     │
//! │  └── Formats: UUIDs, customer names                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  ├── UNIQUE(order_number)                                              │
//! │  └── Foreign keys, CHECK(quantity > 0)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators take the wire field name so errors point at the exact input
//! (`widthFt`, `copies`, `items[2].quantity`).

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_DIMENSION_FT, MAX_EYELETS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a copies/quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ## Example
/// ```rust
/// use press_core::validation::validate_quantity;
///
/// assert!(validate_quantity("copies", 1).is_ok());
/// assert!(validate_quantity("copies", 0).is_err());
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an eyelet count.
///
/// ## Rules
/// - Zero is allowed (plain tarp)
/// - Negative is an error, never clamped
pub fn validate_eyelets(field: &str, eyelets: i64) -> ValidationResult<()> {
    if eyelets < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if eyelets > MAX_EYELETS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_EYELETS,
        });
    }

    Ok(())
}

/// Validates a tarpaulin side length in feet.
///
/// ## Rules
/// - Must be a finite number
/// - Must be > 0 (≤ 0 is an error, not silently clamped)
/// - Must not exceed MAX_DIMENSION_FT
///
/// ## Example
/// ```rust
/// use press_core::validation::validate_dimension;
///
/// assert!(validate_dimension("widthFt", 3.5).is_ok());
/// assert!(validate_dimension("widthFt", 0.0).is_err());
/// assert!(validate_dimension("heightFt", f64::NAN).is_err());
/// ```
pub fn validate_dimension(field: &str, feet: f64) -> ValidationResult<()> {
    if !feet.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if feet <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if feet > MAX_DIMENSION_FT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_DIMENSION_FT as i64,
        });
    }

    Ok(())
}

/// Validates an amount in cents submitted by the client.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, no discount)
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a checkout.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS
pub fn validate_cart_size(items: usize) -> ValidationResult<()> {
    if items > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use press_core::validation::validate_uuid;
///
/// assert!(validate_uuid("customerId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("customerId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a free-text name (customer name, service name).
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", MAX_ITEM_QUANTITY).is_ok());

        assert_eq!(
            validate_quantity("copies", 0),
            Err(ValidationError::MustBePositive {
                field: "copies".to_string()
            })
        );
        assert!(validate_quantity("quantity", -1).is_err());
        assert!(validate_quantity("quantity", MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_eyelets() {
        assert!(validate_eyelets("eyelets", 0).is_ok());
        assert!(validate_eyelets("eyelets", 12).is_ok());
        assert!(validate_eyelets("eyelets", -1).is_err());
        assert!(validate_eyelets("eyelets", MAX_EYELETS + 1).is_err());
    }

    #[test]
    fn test_validate_dimension() {
        assert!(validate_dimension("widthFt", 0.5).is_ok());
        assert!(validate_dimension("widthFt", MAX_DIMENSION_FT).is_ok());

        assert!(validate_dimension("widthFt", 0.0).is_err());
        assert!(validate_dimension("widthFt", -3.0).is_err());
        assert!(validate_dimension("widthFt", f64::INFINITY).is_err());
        assert!(validate_dimension("widthFt", f64::NAN).is_err());
        assert!(validate_dimension("widthFt", MAX_DIMENSION_FT + 1.0).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("discount", 0).is_ok());
        assert!(validate_amount_cents("discount", 500).is_ok());
        assert!(validate_amount_cents("discount", -1).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("customerName", "  Ana Cruz ").unwrap(), "Ana Cruz");
        assert!(validate_name("customerName", "   ").is_err());
        assert!(validate_name("customerName", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
