//! # Price Calculator
//!
//! Turns one [`ServiceSpecification`] plus its matching [`RuleSet`] into a
//! [`PriceResult`]. Pure and synchronous: the same inputs always produce the
//! same output, and nothing here reads a clock, a database or a global.
//!
//! ## Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ DOCUMENT, AutoDetect + pageAnalysis                                     │
//! │   colorRate = colorPageRate + surcharge(paperType)                      │
//! │   bwRate    = blackPageRate + surcharge(paperType)                      │
//! │   perCopy   = colorPages × colorRate + bwPages × bwRate                 │
//! │   total     = perCopy × copies                                          │
//! │   unit      = perCopy / max(pageCount, 1)        (average, display)     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ DOCUMENT, Color | BlackAndWhite | AutoDetect without analysis           │
//! │   baseRate  = color | black | midpoint(color, black)                    │
//! │   unit      = baseRate + surcharge(paperType)    (per page)             │
//! │   total     = unit × pages × copies      pages = pageCount or 1         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ TARPAULIN                                                               │
//! │   baseCost  = width × height × basePrice                                │
//! │   total     = baseCost + eyelets × eyeletPrice + rope? + stand?         │
//! │   unit      = baseCost                   (add-ons are per order)        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ LAMINATION                                                              │
//! │   unit      = basePrice × sizeMultipliers[size]  (missing → ×1)        │
//! │   total     = unit × quantity                                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ STANDARD                                                                │
//! │   unit      = basePrice;  total = unit × quantity                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All money is integer cents. Fractional factors (area, multiplier,
//! midpoint, average) go through `Decimal` and are rounded once, half away
//! from zero.
//!
//! ## Lookup Misses
//! A paper type or lamination size absent from its table resolves to the
//! neutral value and is reported in [`PriceResult::lookup_misses`]. The caller
//! decides how to log it; this module has no side effects.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::rules::{DocumentRules, LaminationRules, RuleSet, StandardRules, TarpaulinRules};
use crate::spec::{
    ColorMode, DocumentSpec, LaminationSpec, ServiceSpecification, StandardSpec, TarpaulinSpec,
};
use crate::types::ServiceType;

// =============================================================================
// Breakdown Keys
// =============================================================================

/// Stable breakdown keys. The UI and receipts read these by name, so they
/// are part of the wire contract.
pub mod keys {
    // Common to every service type
    pub const UNIT_PRICE: &str = "unitPrice";
    pub const TOTAL: &str = "total";
    pub const QUANTITY: &str = "quantity";

    // Document
    pub const PAPER_SIZE: &str = "paperSize";
    pub const PAPER_TYPE: &str = "paperType";
    pub const COLOR_MODE: &str = "colorMode";
    pub const COPIES: &str = "copies";
    pub const PAPER_SURCHARGE: &str = "paperSurcharge";
    pub const COLOR_RATE: &str = "colorRate";
    pub const BW_RATE: &str = "bwRate";
    pub const COLOR_PAGES: &str = "colorPages";
    pub const BW_PAGES: &str = "bwPages";
    pub const TOTAL_PAGES: &str = "totalPages";
    pub const PER_COPY_TOTAL: &str = "perCopyTotal";
    /// `"color"`, `"blackAndWhite"` or `"midpoint"`.
    pub const RATE_BASIS: &str = "rateBasis";
    pub const BASE_RATE: &str = "baseRate";
    pub const PAGE_RATE: &str = "pageRate";
    pub const PAGES: &str = "pages";

    // Tarpaulin
    pub const WIDTH_FT: &str = "widthFt";
    pub const HEIGHT_FT: &str = "heightFt";
    pub const AREA_SQ_FT: &str = "areaSqFt";
    pub const BASE_PRICE_PER_SQ_FT: &str = "basePricePerSqFt";
    pub const BASE_COST: &str = "baseCost";
    pub const EYELETS: &str = "eyelets";
    pub const EYELET_PRICE: &str = "eyeletPrice";
    pub const EYELET_COST: &str = "eyeletCost";
    pub const ROPE_COST: &str = "ropeCost";
    pub const STAND_COST: &str = "standCost";

    // Lamination / Standard
    pub const SIZE: &str = "size";
    pub const BASE_PRICE: &str = "basePrice";
    pub const MULTIPLIER: &str = "multiplier";
}

// =============================================================================
// Result Types
// =============================================================================

/// One breakdown entry. Serializes as a bare number or string.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum BreakdownValue {
    Amount(Money),
    Count(i64),
    Measure(f64),
    Label(String),
}

/// The table a neutral-default lookup fell through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum LookupTable {
    PaperTypes,
    SizeMultipliers,
}

/// A rule-table key that was absent and resolved to its neutral value.
/// Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RuleLookupMiss {
    pub table: LookupTable,
    pub key: String,
}

/// Output of [`price`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceResult {
    pub unit_price: Money,
    pub total: Money,
    pub breakdown: BTreeMap<String, BreakdownValue>,
    pub lookup_misses: Vec<RuleLookupMiss>,
}

#[derive(Default)]
struct Breakdown {
    entries: BTreeMap<String, BreakdownValue>,
    misses: Vec<RuleLookupMiss>,
}

impl Breakdown {
    fn amount(&mut self, key: &str, value: Money) -> &mut Self {
        self.entries.insert(key.to_string(), BreakdownValue::Amount(value));
        self
    }

    fn count(&mut self, key: &str, value: i64) -> &mut Self {
        self.entries.insert(key.to_string(), BreakdownValue::Count(value));
        self
    }

    fn measure(&mut self, key: &str, value: f64) -> &mut Self {
        self.entries.insert(key.to_string(), BreakdownValue::Measure(value));
        self
    }

    fn label(&mut self, key: &str, value: &str) -> &mut Self {
        self.entries.insert(key.to_string(), BreakdownValue::Label(value.to_string()));
        self
    }

    fn miss(&mut self, table: LookupTable, key: &str) {
        self.misses.push(RuleLookupMiss {
            table,
            key: key.to_string(),
        });
    }

    fn finish(mut self, unit_price: Money, total: Money) -> PriceResult {
        self.amount(keys::UNIT_PRICE, unit_price).amount(keys::TOTAL, total);
        PriceResult {
            unit_price,
            total,
            breakdown: self.entries,
            lookup_misses: self.misses,
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Prices one specification against its rule set.
///
/// ## Errors
/// - `InvalidSpecification` for out-of-range inputs, naming the field
/// - `InvalidRuleSet` for a rule set that fails validation
/// - `RuleSetMismatch` when the rule set belongs to another service type
/// - `Overflow` if the result leaves the `i64` cents range
///
/// ## Example
/// ```rust
/// use press_core::money::Money;
/// use press_core::pricing::price;
/// use press_core::rules::{RuleSet, StandardRules};
/// use press_core::spec::{ServiceSpecification, StandardSpec};
///
/// let rules = RuleSet::Standard(StandardRules { base_price: Money::from_cents(1500) });
/// let spec = ServiceSpecification::Standard(StandardSpec { quantity: 3 });
///
/// let result = price(&spec, &rules).unwrap();
/// assert_eq!(result.unit_price.cents(), 1500);
/// assert_eq!(result.total.cents(), 4500);
/// ```
pub fn price(spec: &ServiceSpecification, rules: &RuleSet) -> CoreResult<PriceResult> {
    spec.validate()?;
    rules.validate()?;

    match (spec, rules) {
        (ServiceSpecification::Document(s), RuleSet::Document(r)) => price_document(s, r),
        (ServiceSpecification::Tarpaulin(s), RuleSet::Tarpaulin(r)) => price_tarpaulin(s, r),
        (ServiceSpecification::Lamination(s), RuleSet::Lamination(r)) => price_lamination(s, r),
        (ServiceSpecification::Standard(s), RuleSet::Standard(r)) => price_standard(s, r),
        _ => Err(CoreError::RuleSetMismatch {
            expected: spec.service_type(),
            found: rules.service_type(),
        }),
    }
}

fn overflow(what: &str) -> CoreError {
    CoreError::Overflow(what.to_string())
}

fn add(a: Money, b: Money, what: &str) -> CoreResult<Money> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

fn times(m: Money, n: i64, what: &str) -> CoreResult<Money> {
    m.checked_times(n).ok_or_else(|| overflow(what))
}

// =============================================================================
// Document
// =============================================================================

fn price_document(spec: &DocumentSpec, rules: &DocumentRules) -> CoreResult<PriceResult> {
    let mut b = Breakdown::default();

    let surcharge = match rules.paper_types.get(&spec.paper_type) {
        Some(surcharge) => *surcharge,
        None => {
            b.miss(LookupTable::PaperTypes, &spec.paper_type);
            Money::zero()
        }
    };

    b.label(keys::PAPER_SIZE, &spec.paper_size)
        .label(keys::PAPER_TYPE, &spec.paper_type)
        .label(keys::COLOR_MODE, spec.color_mode.as_str())
        .count(keys::COPIES, spec.copies)
        .amount(keys::PAPER_SURCHARGE, surcharge);

    match (spec.color_mode, spec.page_analysis) {
        (ColorMode::AutoDetect, Some(analysis)) => {
            let color_rate = add(rules.color_page_rate, surcharge, "colorRate")?;
            let bw_rate = add(rules.black_page_rate, surcharge, "bwRate")?;

            let per_copy = add(
                times(color_rate, analysis.color_pages, "color pages")?,
                times(bw_rate, analysis.bw_pages, "bw pages")?,
                "perCopyTotal",
            )?;
            let total = times(per_copy, spec.copies, "total")?;
            let unit_price = per_copy
                .divide_round(analysis.page_count.max(1))
                .ok_or_else(|| overflow("unitPrice"))?;

            b.amount(keys::COLOR_RATE, color_rate)
                .amount(keys::BW_RATE, bw_rate)
                .count(keys::COLOR_PAGES, analysis.color_pages)
                .count(keys::BW_PAGES, analysis.bw_pages)
                .count(keys::TOTAL_PAGES, analysis.page_count)
                .amount(keys::PER_COPY_TOTAL, per_copy);

            Ok(b.finish(unit_price, total))
        }
        (mode, analysis) => {
            let (basis, base_rate) = match mode {
                ColorMode::Color => ("color", rules.color_page_rate),
                ColorMode::BlackAndWhite => ("blackAndWhite", rules.black_page_rate),
                ColorMode::AutoDetect => (
                    "midpoint",
                    Money::midpoint(rules.color_page_rate, rules.black_page_rate)
                        .ok_or_else(|| overflow("midpoint rate"))?,
                ),
            };
            let page_rate = add(base_rate, surcharge, "pageRate")?;
            let pages = analysis.map(|a| a.page_count.max(1)).unwrap_or(1);
            let total = times(times(page_rate, pages, "pages")?, spec.copies, "total")?;

            b.label(keys::RATE_BASIS, basis)
                .amount(keys::BASE_RATE, base_rate)
                .amount(keys::PAGE_RATE, page_rate)
                .count(keys::PAGES, pages);

            Ok(b.finish(page_rate, total))
        }
    }
}

// =============================================================================
// Tarpaulin
// =============================================================================

fn feet(field: &str, value: f64) -> CoreResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        CoreError::InvalidSpecification(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "not representable as a decimal".to_string(),
        })
    })
}

fn price_tarpaulin(spec: &TarpaulinSpec, rules: &TarpaulinRules) -> CoreResult<PriceResult> {
    let width = feet("widthFt", spec.width_ft)?;
    let height = feet("heightFt", spec.height_ft)?;
    let area = width.checked_mul(height).ok_or_else(|| overflow("area"))?;

    let base_cost = rules.base_price.scale(area).ok_or_else(|| overflow("baseCost"))?;
    let eyelet_cost = times(rules.eyelet_price, spec.eyelets, "eyeletCost")?;
    let rope_cost = if spec.include_rope { rules.rope_price } else { Money::zero() };
    let stand_cost = if spec.include_stand { rules.stand_price } else { Money::zero() };

    let total = [eyelet_cost, rope_cost, stand_cost]
        .into_iter()
        .try_fold(base_cost, |acc, part| add(acc, part, "total"))?;

    let mut b = Breakdown::default();
    b.measure(keys::WIDTH_FT, spec.width_ft)
        .measure(keys::HEIGHT_FT, spec.height_ft)
        .measure(keys::AREA_SQ_FT, area.to_f64().unwrap_or(f64::NAN))
        .amount(keys::BASE_PRICE_PER_SQ_FT, rules.base_price)
        .amount(keys::BASE_COST, base_cost)
        .count(keys::EYELETS, spec.eyelets)
        .amount(keys::EYELET_PRICE, rules.eyelet_price)
        .amount(keys::EYELET_COST, eyelet_cost)
        .amount(keys::ROPE_COST, rope_cost)
        .amount(keys::STAND_COST, stand_cost);

    Ok(b.finish(base_cost, total))
}

// =============================================================================
// Lamination
// =============================================================================

fn price_lamination(spec: &LaminationSpec, rules: &LaminationRules) -> CoreResult<PriceResult> {
    let mut b = Breakdown::default();

    let multiplier = match rules.size_multipliers.get(&spec.size) {
        Some(m) => *m,
        None => {
            b.miss(LookupTable::SizeMultipliers, spec.size.as_str());
            1.0
        }
    };
    let factor = Decimal::from_f64(multiplier).ok_or_else(|| CoreError::InvalidRuleSet {
        service_type: ServiceType::Lamination,
        reason: format!("multiplier {} is not representable", multiplier),
    })?;

    let unit_price = rules.base_price.scale(factor).ok_or_else(|| overflow("unitPrice"))?;
    let total = times(unit_price, spec.quantity, "total")?;

    b.label(keys::SIZE, spec.size.as_str())
        .amount(keys::BASE_PRICE, rules.base_price)
        .measure(keys::MULTIPLIER, multiplier)
        .count(keys::QUANTITY, spec.quantity);

    Ok(b.finish(unit_price, total))
}

// =============================================================================
// Standard
// =============================================================================

fn price_standard(spec: &StandardSpec, rules: &StandardRules) -> CoreResult<PriceResult> {
    let total = times(rules.base_price, spec.quantity, "total")?;

    let mut b = Breakdown::default();
    b.amount(keys::BASE_PRICE, rules.base_price)
        .count(keys::QUANTITY, spec.quantity);

    Ok(b.finish(rules.base_price, total))
}

// =============================================================================
// Unit Tests
// =============================================================================
