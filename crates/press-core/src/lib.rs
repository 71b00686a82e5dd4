//! # press-core: Pure Business Logic for PrintPress POS
//!
//! This crate holds the two pieces of the print shop backend that carry real
//! logic: the variable-specification **pricing engine** and the
//! **order-number allocation protocol**. Everything here is a pure function
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PrintPress Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Order Entry UI                               │   │
//! │  │    Spec Form ──► Quote ──► Cart ──► Checkout ──► Receipt       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (press-api)                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ press-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   rules   │  │  pricing  │  │ checkout  │  │ order_no  │  │   │
//! │  │   │  RuleSet  │─►│ price()   │─►│ verify()  │  │ Allocation│  │   │
//! │  │   │           │  │ Breakdown │  │           │  │   Plan    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    press-db (Database Layer)                    │   │
//! │  │      catalog, atomic order+items insert, allocation retries     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (cents)
//! - [`types`] - Domain types (Service, Order, OrderItem, enums)
//! - [`spec`] - Per-service-type specifications (tagged union)
//! - [`rules`] - Per-service-type rule sets (tagged union, load-time validated)
//! - [`pricing`] - The price calculator
//! - [`order_number`] - Order-number format, candidate planning, day windows
//! - [`checkout`] - Server-side re-pricing and total verification of a cart
//! - [`validation`] - Field-level validation helpers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use press_core::money::Money;
//! use press_core::pricing::price;
//! use press_core::rules::{RuleSet, TarpaulinRules};
//! use press_core::spec::{ServiceSpecification, TarpaulinSpec};
//!
//! let rules = RuleSet::Tarpaulin(TarpaulinRules {
//!     base_price: Money::from_major_minor(25, 0),
//!     eyelet_price: Money::from_major_minor(10, 0),
//!     rope_price: Money::from_major_minor(50, 0),
//!     stand_price: Money::from_major_minor(200, 0),
//! });
//! let spec = ServiceSpecification::Tarpaulin(TarpaulinSpec {
//!     width_ft: 3.0,
//!     height_ft: 4.0,
//!     eyelets: 6,
//!     include_rope: true,
//!     include_stand: false,
//! });
//!
//! let result = price(&spec, &rules).unwrap();
//! assert_eq!(result.total, Money::from_major_minor(410, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod order_number;
pub mod pricing;
pub mod rules;
pub mod spec;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutLine, CheckoutRequest, RuleSource, VerifiedCheckout, VerifiedLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order_number::{AllocationPlan, DayWindow, OrderNumber, ShopZone};
pub use pricing::{price, BreakdownValue, PriceResult, RuleLookupMiss};
pub use rules::{PricingConfig, RuleSet};
pub use spec::ServiceSpecification;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum copies / quantity on a single line.
///
/// ## Business Reason
/// Flyer runs go into the thousands; anything past this is a typo and would
/// only risk overflow in the money math.
pub const MAX_ITEM_QUANTITY: i64 = 100_000;

/// Maximum eyelets on a single tarpaulin.
pub const MAX_EYELETS: i64 = 10_000;

/// Maximum tarpaulin side length in feet.
pub const MAX_DIMENSION_FT: f64 = 1_000.0;

/// Maximum length of free-text names (customer name, service name).
pub const MAX_NAME_LENGTH: usize = 200;
