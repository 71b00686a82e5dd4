//! # Domain Types
//!
//! Core domain types used throughout PrintPress.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Service      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  service_type   │   │  total_cents    │   │  specification  │       │
//! │  │  rules: RuleSet │   │  payment_*      │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ServiceType    │   │ PaymentMethod   │   │ PaymentStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Document       │   │  Cash           │   │  Paid           │       │
//! │  │  Tarpaulin      │   │  Card           │   │  Partial        │       │
//! │  │  Lamination     │   │  EWallet        │   │  Unpaid         │       │
//! │  │  Standard       │   │  BankTransfer   │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders carry both:
//! - `id`: UUID v4 - immutable, used for relations and API paths
//! - `order_number`: `ORD-YYMMDD-NNNN[-RRR]` - human-readable, printed on the
//!   claim slip, never reused even after a soft delete

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::rules::RuleSet;
use crate::spec::ServiceSpecification;

// =============================================================================
// Service Type
// =============================================================================

/// The closed set of service kinds the shop prices.
///
/// Adding a variant here is a compile-time-checked extension: every
/// `match` in pricing and rule validation must then handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Printing / photocopy, priced per page.
    Document,
    /// Tarpaulin banners, priced by area plus add-ons.
    Tarpaulin,
    /// Lamination, priced by size tier.
    Lamination,
    /// Flat per-unit services (binding, scanning, ...).
    Standard,
}

impl ServiceType {
    /// All variants in display order.
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Document,
        ServiceType::Tarpaulin,
        ServiceType::Lamination,
        ServiceType::Standard,
    ];

    /// The wire / database spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Document => "document",
            ServiceType::Tarpaulin => "tarpaulin",
            ServiceType::Lamination => "lamination",
            ServiceType::Standard => "standard",
        }
    }

    /// Whether the price depends on a specification beyond quantity.
    pub const fn is_dynamic(&self) -> bool {
        !matches!(self, ServiceType::Standard)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method / Status
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Mobile wallet transfer.
    #[serde(rename = "e_wallet")]
    EWallet,
    /// Bank deposit or transfer.
    BankTransfer,
}

/// Whether the customer has settled the order.
///
/// Print jobs are often paid with a down payment at drop-off and the
/// balance at pickup, hence `Partial`.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Service
// =============================================================================

/// A catalog entry: one service the shop sells, with its rule set.
///
/// ## Invariant
/// `rules.service_type() == service_type`; press-db enforces this when it
/// loads a row and refuses rows that break it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub rules: RuleSet,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted customer order.
///
/// Money columns are stored as plain cents, as in the database; use the
/// accessors for `Money`. On the wire they drop the `_cents` suffix
/// (`subtotal`, `discount`, `total`) but stay integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// `ORD-YYMMDD-NNNN` or `ORD-YYMMDD-NNNN-RRR`. Immutable.
    pub order_number: String,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    /// Sum of line amounts.
    #[serde(rename = "subtotal")]
    pub subtotal_cents: i64,
    #[serde(rename = "discount")]
    pub discount_cents: i64,
    /// subtotal − discount.
    #[serde(rename = "total")]
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Soft delete marker. Deleted orders still hold their number.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether the order has been soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line on an order.
///
/// Snapshot pattern: the specification and the prices are frozen at
/// checkout, so later rule changes never alter a past order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub service_id: String,
    pub service_type: ServiceType,
    pub specification: ServiceSpecification,
    pub quantity: i64,
    #[serde(rename = "unitPrice")]
    pub unit_price_cents: i64,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_wire_names() {
        for service_type in ServiceType::ALL {
            let json = serde_json::to_string(&service_type).unwrap();
            assert_eq!(json, format!("\"{}\"", service_type.as_str()));
        }
        assert!(!ServiceType::Standard.is_dynamic());
        assert!(ServiceType::Tarpaulin.is_dynamic());
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::EWallet).unwrap(),
            "\"e_wallet\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_order_money_accessors() {
        let now = Utc::now();
        let order = Order {
            id: "o-1".to_string(),
            order_number: "ORD-250114-0001".to_string(),
            customer_id: None,
            customer_name: Some("Ana".to_string()),
            subtotal_cents: 41000,
            discount_cents: 1000,
            total_cents: 40000,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert_eq!(order.total(), order.subtotal() - order.discount());
        assert!(!order.is_deleted());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderNumber"], "ORD-250114-0001");
        assert_eq!(json["subtotal"], 41000);
        assert_eq!(json["total"], 40000);
        assert!(json.get("total").is_none());
    }
}
