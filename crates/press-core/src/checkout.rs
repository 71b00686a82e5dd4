//! # Checkout
//!
//! Server-side verification of a submitted cart.
//!
//! The order-entry UI prices every line for display and submits those
//! figures with the cart. The server never trusts them: each line is
//! re-priced from its specification and the catalog's rule set, and every
//! submitted amount must match exactly before anything is persisted.
//!
//! ## Verification Order
//! ```text
//! CheckoutRequest
//!   │
//!   ├── items empty?                          → EmptyCart
//!   ├── items > MAX_CART_ITEMS?               → CartTooLarge
//!   ├── discount < 0, bad customerId/name     → InvalidSpecification
//!   │
//!   ├── for each line i:
//!   │     serviceType ≠ specification tag     → InvalidSpecification
//!   │     service unknown                     → UnknownService
//!   │     price(spec, rules)                  → (any pricing error)
//!   │     quantity ≠ effective quantity       → CheckoutMismatch items[i].quantity
//!   │     unitPrice ≠ computed           → CheckoutMismatch items[i].unitPrice
//!   │     amount ≠ computed total        → CheckoutMismatch items[i].amount
//!   │
//!   ├── discount > subtotal                   → InvalidSpecification
//!   └── total ≠ subtotal − discount      → CheckoutMismatch total
//!         │
//!         ▼
//!   VerifiedCheckout (safe to persist)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{price, PriceResult, RuleLookupMiss};
use crate::rules::RuleSet;
use crate::spec::ServiceSpecification;
use crate::types::{PaymentMethod, PaymentStatus, ServiceType};
use crate::validation::{validate_amount_cents, validate_cart_size, validate_name, validate_uuid};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Request Types
// =============================================================================

/// One cart line as submitted by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub service_id: String,
    pub service_type: ServiceType,
    pub specification: ServiceSpecification,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

/// The body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    pub total: Money,
    #[serde(default)]
    pub discount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
}

// =============================================================================
// Rule Source
// =============================================================================

/// Where checkout finds the rule set for a service id.
///
/// press-db loads the referenced services into a map before verifying; tests
/// use a literal map.
pub trait RuleSource {
    fn rules_for(&self, service_id: &str) -> Option<&RuleSet>;
}

impl RuleSource for HashMap<String, RuleSet> {
    fn rules_for(&self, service_id: &str) -> Option<&RuleSet> {
        self.get(service_id)
    }
}

// =============================================================================
// Verified Output
// =============================================================================

/// A line whose figures the server has recomputed and confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedLine {
    pub service_id: String,
    pub service_type: ServiceType,
    pub specification: ServiceSpecification,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

/// A cart that passed every check. Only this is handed to persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCheckout {
    pub lines: Vec<VerifiedLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    /// Neutral-default lookups hit while re-pricing, for the caller to log.
    pub lookup_misses: Vec<RuleLookupMiss>,
}

impl CheckoutRequest {
    /// Re-prices every line and checks the submitted figures.
    ///
    /// ## Example
    /// ```rust
    /// use std::collections::HashMap;
    /// use press_core::checkout::{CheckoutLine, CheckoutRequest};
    /// use press_core::money::Money;
    /// use press_core::rules::{RuleSet, StandardRules};
    /// use press_core::spec::{ServiceSpecification, StandardSpec};
    /// use press_core::types::{PaymentMethod, PaymentStatus, ServiceType};
    ///
    /// let mut catalog = HashMap::new();
    /// catalog.insert(
    ///     "binding".to_string(),
    ///     RuleSet::Standard(StandardRules { base_price: Money::from_cents(5000) }),
    /// );
    ///
    /// let request = CheckoutRequest {
    ///     items: vec![CheckoutLine {
    ///         service_id: "binding".to_string(),
    ///         service_type: ServiceType::Standard,
    ///         specification: ServiceSpecification::Standard(StandardSpec { quantity: 2 }),
    ///         quantity: 2,
    ///         unit_price: Money::from_cents(5000),
    ///         amount: Money::from_cents(10000),
    ///     }],
    ///     total: Money::from_cents(9000),
    ///     discount: Money::from_cents(1000),
    ///     payment_method: PaymentMethod::Cash,
    ///     payment_status: PaymentStatus::Paid,
    ///     customer_id: None,
    ///     customer_name: None,
    /// };
    ///
    /// let verified = request.verify(&catalog).unwrap();
    /// assert_eq!(verified.subtotal, Money::from_cents(10000));
    /// assert_eq!(verified.total, Money::from_cents(9000));
    /// ```
    pub fn verify<R: RuleSource + ?Sized>(self, rules: &R) -> CoreResult<VerifiedCheckout> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if validate_cart_size(self.items.len()).is_err() {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        validate_amount_cents("discount", self.discount.cents())?;
        validate_amount_cents("total", self.total.cents())?;
        if let Some(id) = &self.customer_id {
            validate_uuid("customerId", id)?;
        }
        let customer_name = match self.customer_name.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(validate_name("customerName", name)?),
        };

        let mut lines = Vec::with_capacity(self.items.len());
        let mut lookup_misses = Vec::new();
        let mut subtotal = Money::zero();

        for (index, line) in self.items.into_iter().enumerate() {
            let priced = verify_line(index, &line, rules)?;
            subtotal = subtotal
                .checked_add(priced.total)
                .ok_or_else(|| CoreError::Overflow("subtotal".to_string()))?;
            lookup_misses.extend(priced.lookup_misses);

            lines.push(VerifiedLine {
                service_id: line.service_id,
                service_type: line.service_type,
                specification: line.specification,
                quantity: line.quantity,
                unit_price: priced.unit_price,
                amount: priced.total,
            });
        }

        if self.discount > subtotal {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: subtotal.cents(),
            }
            .into());
        }

        let expected_total = subtotal - self.discount;
        if self.total != expected_total {
            return Err(CoreError::CheckoutMismatch {
                field: "total".to_string(),
                expected: expected_total.cents(),
                actual: self.total.cents(),
            });
        }

        Ok(VerifiedCheckout {
            lines,
            subtotal,
            discount: self.discount,
            total: expected_total,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            customer_id: self.customer_id,
            customer_name,
            lookup_misses,
        })
    }
}

fn verify_line<R: RuleSource + ?Sized>(
    index: usize,
    line: &CheckoutLine,
    rules: &R,
) -> CoreResult<PriceResult> {
    let field = |name: &str| format!("items[{}].{}", index, name);

    if line.service_type != line.specification.service_type() {
        return Err(ValidationError::InvalidFormat {
            field: field("serviceType"),
            reason: format!(
                "{} does not match specification type {}",
                line.service_type,
                line.specification.service_type()
            ),
        }
        .into());
    }

    let rule_set = rules
        .rules_for(&line.service_id)
        .ok_or_else(|| CoreError::UnknownService(line.service_id.clone()))?;
    let priced = price(&line.specification, rule_set)?;

    let checks = [
        ("quantity", line.specification.effective_quantity(), line.quantity),
        ("unitPrice", priced.unit_price.cents(), line.unit_price.cents()),
        ("amount", priced.total.cents(), line.amount.cents()),
    ];
    for (name, expected, actual) in checks {
        if expected != actual {
            return Err(CoreError::CheckoutMismatch {
                field: field(name),
                expected,
                actual,
            });
        }
    }

    Ok(priced)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{StandardRules, TarpaulinRules};
    use crate::spec::{StandardSpec, TarpaulinSpec};

    fn catalog() -> HashMap<String, RuleSet> {
        HashMap::from([
            (
                "tarp".to_string(),
                RuleSet::Tarpaulin(TarpaulinRules {
                    base_price: Money::from_cents(2500),
                    eyelet_price: Money::from_cents(1000),
                    rope_price: Money::from_cents(5000),
                    stand_price: Money::from_cents(20000),
                }),
            ),
            (
                "scan".to_string(),
                RuleSet::Standard(StandardRules {
                    base_price: Money::from_cents(500),
                }),
            ),
        ])
    }

    fn tarp_line() -> CheckoutLine {
        CheckoutLine {
            service_id: "tarp".to_string(),
            service_type: ServiceType::Tarpaulin,
            specification: ServiceSpecification::Tarpaulin(TarpaulinSpec {
                width_ft: 3.0,
                height_ft: 4.0,
                eyelets: 6,
                include_rope: true,
                include_stand: false,
            }),
            quantity: 1,
            unit_price: Money::from_cents(30000),
            amount: Money::from_cents(41000),
        }
    }

    fn scan_line(quantity: i64) -> CheckoutLine {
        CheckoutLine {
            service_id: "scan".to_string(),
            service_type: ServiceType::Standard,
            specification: ServiceSpecification::Standard(StandardSpec { quantity }),
            quantity,
            unit_price: Money::from_cents(500),
            amount: Money::from_cents(500 * quantity),
        }
    }

    fn request(items: Vec<CheckoutLine>, total: i64, discount: i64) -> CheckoutRequest {
        CheckoutRequest {
            items,
            total: Money::from_cents(total),
            discount: Money::from_cents(discount),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            customer_id: None,
            customer_name: Some("  Ana Cruz ".to_string()),
        }
    }

    #[test]
    fn test_verify_accepts_matching_cart() {
        let verified = request(vec![tarp_line(), scan_line(4)], 43000 - 1000, 1000)
            .verify(&catalog())
            .unwrap();

        assert_eq!(verified.lines.len(), 2);
        assert_eq!(verified.subtotal, Money::from_cents(43000));
        assert_eq!(verified.total, Money::from_cents(42000));
        assert_eq!(verified.customer_name.as_deref(), Some("Ana Cruz"));
        assert_eq!(verified.lines[0].amount, Money::from_cents(41000));
    }

    #[test]
    fn test_verify_rejects_tampered_amount() {
        let mut line = tarp_line();
        line.amount = Money::from_cents(100);

        let err = request(vec![scan_line(1), line], 600, 0)
            .verify(&catalog())
            .unwrap_err();
        match err {
            CoreError::CheckoutMismatch { field, expected, actual } => {
                assert_eq!(field, "items[1].amount");
                assert_eq!(expected, 41000);
                assert_eq!(actual, 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_tarpaulin_quantity_other_than_one() {
        let mut line = tarp_line();
        line.quantity = 2;
        let err = request(vec![line], 41000, 0).verify(&catalog()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CheckoutMismatch { ref field, .. } if field == "items[0].quantity"
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_total() {
        let err = request(vec![scan_line(2)], 999, 0).verify(&catalog()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CheckoutMismatch { expected: 1000, actual: 999, .. }
        ));
    }

    #[test]
    fn test_verify_rejects_discount_above_subtotal() {
        let err = request(vec![scan_line(1)], 0, 600).verify(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSpecification(_)));

        let err = request(vec![scan_line(1)], 600, -100).verify(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSpecification(_)));
    }

    #[test]
    fn test_verify_rejects_empty_and_oversized_carts() {
        assert!(matches!(
            request(vec![], 0, 0).verify(&catalog()),
            Err(CoreError::EmptyCart)
        ));

        let lines = (0..=MAX_CART_ITEMS).map(|_| scan_line(1)).collect::<Vec<_>>();
        let total = 500 * lines.len() as i64;
        assert!(matches!(
            request(lines, total, 0).verify(&catalog()),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_unknown_service_and_type_mismatch() {
        let mut line = scan_line(1);
        line.service_id = "missing".to_string();
        assert!(matches!(
            request(vec![line], 500, 0).verify(&catalog()),
            Err(CoreError::UnknownService(id)) if id == "missing"
        ));

        let mut line = scan_line(1);
        line.service_type = ServiceType::Lamination;
        assert!(matches!(
            request(vec![line], 500, 0).verify(&catalog()),
            Err(CoreError::InvalidSpecification(_))
        ));

        // Standard spec pointed at a tarpaulin service
        let mut line = scan_line(1);
        line.service_id = "tarp".to_string();
        assert!(matches!(
            request(vec![line], 500, 0).verify(&catalog()),
            Err(CoreError::RuleSetMismatch { .. })
        ));
    }

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{
            "items": [{
                "serviceId": "scan",
                "serviceType": "standard",
                "specification": { "serviceType": "standard", "quantity": 2 },
                "quantity": 2,
                "unitPrice": 500,
                "amount": 1000
            }],
            "total": 1000,
            "paymentMethod": "e_wallet"
        }"#;
        let parsed: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.discount, Money::zero());
        assert_eq!(parsed.payment_status, PaymentStatus::Unpaid);
        assert_eq!(parsed.payment_method, PaymentMethod::EWallet);
        assert!(parsed.verify(&catalog()).is_ok());
    }
}
