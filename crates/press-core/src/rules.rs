//! # Rule Sets
//!
//! Per-service-type pricing configuration: rates, add-on prices and lookup
//! tables. Immutable once loaded and passed explicitly to the calculator;
//! there is no process-wide default table.
//!
//! ## Closed Tagged Union
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  services.rules_json (TEXT)                                             │
//! │       │                                                                 │
//! │       ▼  serde (tag = "serviceType")                                    │
//! │  RuleSet::Document | Tarpaulin | Lamination | Standard                  │
//! │       │                                                                 │
//! │       ▼  RuleSet::validate()                                            │
//! │  negative rate / NaN multiplier ──► InvalidRuleSet (load fails)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price(spec, rules) ── type mismatch ──► RuleSetMismatch               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lookup table may lack a key. That is a valid configuration meaning
//! "neutral" (no surcharge, ×1), not a load error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::spec::LaminationSize;
use crate::types::ServiceType;

// =============================================================================
// Per-Type Rules
// =============================================================================

/// Document printing rates, per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRules {
    pub color_page_rate: Money,
    pub black_page_rate: Money,
    /// Per-page surcharge in cents, keyed by paper type name.
    #[serde(default)]
    pub paper_types: BTreeMap<String, Money>,
}

/// Tarpaulin prices. `base_price` is per square foot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TarpaulinRules {
    pub base_price: Money,
    pub eyelet_price: Money,
    pub rope_price: Money,
    pub stand_price: Money,
}

/// Lamination price for the reference size, scaled per size tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaminationRules {
    pub base_price: Money,
    #[serde(default)]
    pub size_multipliers: BTreeMap<LaminationSize, f64>,
}

/// Flat per-unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StandardRules {
    pub base_price: Money,
}

// =============================================================================
// Rule Set
// =============================================================================

/// The rules attached to one catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "serviceType", rename_all = "snake_case")]
pub enum RuleSet {
    Document(DocumentRules),
    Tarpaulin(TarpaulinRules),
    Lamination(LaminationRules),
    Standard(StandardRules),
}

impl RuleSet {
    pub const fn service_type(&self) -> ServiceType {
        match self {
            RuleSet::Document(_) => ServiceType::Document,
            RuleSet::Tarpaulin(_) => ServiceType::Tarpaulin,
            RuleSet::Lamination(_) => ServiceType::Lamination,
            RuleSet::Standard(_) => ServiceType::Standard,
        }
    }

    /// Parses and validates a stored rules blob.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::rules::RuleSet;
    /// use press_core::types::ServiceType;
    ///
    /// let rules = RuleSet::from_json(
    ///     r#"{"serviceType":"standard","basePrice":1500}"#,
    /// ).unwrap();
    /// assert_eq!(rules.service_type(), ServiceType::Standard);
    ///
    /// // Negative prices never load
    /// assert!(RuleSet::from_json(r#"{"serviceType":"standard","basePrice":-1}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let rules: RuleSet =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load-time checks: every price ≥ 0, every multiplier finite and ≥ 0.
    pub fn validate(&self) -> CoreResult<()> {
        let service_type = self.service_type();
        let invalid = |reason: String| CoreError::InvalidRuleSet {
            service_type,
            reason,
        };

        match self {
            RuleSet::Document(rules) => {
                non_negative("colorPageRate", rules.color_page_rate).map_err(invalid)?;
                non_negative("blackPageRate", rules.black_page_rate).map_err(invalid)?;
                for (name, surcharge) in &rules.paper_types {
                    non_negative(&format!("paperTypes.{}", name), *surcharge).map_err(invalid)?;
                }
            }
            RuleSet::Tarpaulin(rules) => {
                non_negative("basePrice", rules.base_price).map_err(invalid)?;
                non_negative("eyeletPrice", rules.eyelet_price).map_err(invalid)?;
                non_negative("ropePrice", rules.rope_price).map_err(invalid)?;
                non_negative("standPrice", rules.stand_price).map_err(invalid)?;
            }
            RuleSet::Lamination(rules) => {
                non_negative("basePrice", rules.base_price).map_err(invalid)?;
                for (size, multiplier) in &rules.size_multipliers {
                    if !multiplier.is_finite() || *multiplier < 0.0 {
                        return Err(invalid(format!(
                            "sizeMultipliers.{} must be a finite number >= 0, got {}",
                            size.as_str(),
                            multiplier
                        )));
                    }
                }
            }
            RuleSet::Standard(rules) => {
                non_negative("basePrice", rules.base_price).map_err(invalid)?;
            }
        }

        Ok(())
    }
}

fn non_negative(field: &str, amount: Money) -> Result<(), String> {
    if amount.is_negative() {
        Err(format!("{} must not be negative, got {}", field, amount.cents()))
    } else {
        Ok(())
    }
}

// =============================================================================
// Shop-Wide Pricing Configuration
// =============================================================================

/// The shop-wide configuration shape used to seed the catalog:
/// one rule block per dynamic service type.
///
/// ```text
/// document:   { colorPageRate, blackPageRate, paperTypes: {name: cents} }
/// tarpaulin:  { basePrice, eyeletPrice, ropePrice, standPrice }
/// lamination: { basePrice, sizeMultipliers: {size: factor} }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub document: DocumentRules,
    pub tarpaulin: TarpaulinRules,
    pub lamination: LaminationRules,
}

impl PricingConfig {
    /// Parses the configuration and validates every block.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: PricingConfig =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        let configured = [
            ServiceType::Document,
            ServiceType::Tarpaulin,
            ServiceType::Lamination,
        ];
        for service_type in configured {
            config.rule_set_for(service_type, Money::zero()).validate()?;
        }
        Ok(config)
    }

    /// Resolves the rule set for a service type.
    ///
    /// Standard services are priced per catalog entry, so their flat price
    /// is supplied by the caller.
    pub fn rule_set_for(&self, service_type: ServiceType, standard_base: Money) -> RuleSet {
        match service_type {
            ServiceType::Document => RuleSet::Document(self.document.clone()),
            ServiceType::Tarpaulin => RuleSet::Tarpaulin(self.tarpaulin.clone()),
            ServiceType::Lamination => RuleSet::Lamination(self.lamination.clone()),
            ServiceType::Standard => RuleSet::Standard(StandardRules {
                base_price: standard_base,
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "document": {
            "colorPageRate": 200,
            "blackPageRate": 100,
            "paperTypes": { "Glossy": 100, "Bond": 0 }
        },
        "tarpaulin": {
            "basePrice": 2500,
            "eyeletPrice": 1000,
            "ropePrice": 5000,
            "standPrice": 20000
        },
        "lamination": {
            "basePrice": 2500,
            "sizeMultipliers": { "ID Size": 1.0, "A4": 2.0 }
        }
    }"#;

    #[test]
    fn test_pricing_config_loads() {
        let config = PricingConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.document.paper_types["Glossy"], Money::from_cents(100));
        assert_eq!(config.lamination.size_multipliers[&LaminationSize::A4], 2.0);

        let rules = config.rule_set_for(ServiceType::Standard, Money::from_cents(1500));
        assert_eq!(
            rules,
            RuleSet::Standard(StandardRules {
                base_price: Money::from_cents(1500)
            })
        );
    }

    #[test]
    fn test_rule_set_tag_selects_variant() {
        let rules = RuleSet::from_json(
            r#"{"serviceType":"tarpaulin","basePrice":2500,"eyeletPrice":1000,
                "ropePrice":5000,"standPrice":20000}"#,
        )
        .unwrap();
        assert_eq!(rules.service_type(), ServiceType::Tarpaulin);
    }

    #[test]
    fn test_tarpaulin_fields_under_document_tag_fail_to_load() {
        let err = RuleSet::from_json(
            r#"{"serviceType":"document","basePrice":2500,"eyeletPrice":1000,
                "ropePrice":5000,"standPrice":20000}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_tables_are_valid() {
        let rules = RuleSet::from_json(
            r#"{"serviceType":"lamination","basePrice":2500}"#,
        )
        .unwrap();
        match rules {
            RuleSet::Lamination(l) => assert!(l.size_multipliers.is_empty()),
            other => panic!("expected lamination, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = RuleSet::from_json(
            r#"{"serviceType":"document","colorPageRate":200,"blackPageRate":100,
                "paperTypes":{"Glossy":-5}}"#,
        )
        .unwrap_err();
        match err {
            CoreError::InvalidRuleSet { service_type, reason } => {
                assert_eq!(service_type, ServiceType::Document);
                assert!(reason.contains("paperTypes.Glossy"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let rules = RuleSet::Lamination(LaminationRules {
            base_price: Money::from_cents(2500),
            size_multipliers: BTreeMap::from([(LaminationSize::A5, f64::NAN)]),
        });
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_unknown_lamination_size_key_rejected() {
        let err = RuleSet::from_json(
            r#"{"serviceType":"lamination","basePrice":2500,"sizeMultipliers":{"Poster":3}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }
}
