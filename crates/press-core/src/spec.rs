//! # Service Specifications
//!
//! The customer-provided parameters for one order line, as a closed tagged
//! union keyed by `serviceType`.
//!
//! ## Wire Shape
//! ```text
//! { "serviceType": "document",   "paperSize": "A4", "paperType": "Glossy",
//!   "copies": 2, "colorMode": "AutoDetect",
//!   "pageAnalysis": { "pageCount": 10, "colorPages": 4, "bwPages": 6 } }
//!
//! { "serviceType": "tarpaulin",  "widthFt": 3, "heightFt": 4, "eyelets": 6,
//!   "includeRope": true, "includeStand": false }
//!
//! { "serviceType": "lamination", "size": "ID Size", "quantity": 10 }
//!
//! { "serviceType": "standard",   "quantity": 3 }
//! ```
//!
//! Required enum fields (`colorMode`, lamination `size`) have no safe default:
//! a missing or unknown value fails deserialization and never reaches pricing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::ServiceType;
use crate::validation::{
    validate_dimension, validate_eyelets, validate_quantity, ValidationResult,
};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH};

// =============================================================================
// Service Specification
// =============================================================================

/// One order line's specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "serviceType", rename_all = "snake_case")]
pub enum ServiceSpecification {
    Document(DocumentSpec),
    Tarpaulin(TarpaulinSpec),
    Lamination(LaminationSpec),
    Standard(StandardSpec),
}

impl ServiceSpecification {
    /// The service type this specification belongs to.
    pub const fn service_type(&self) -> ServiceType {
        match self {
            ServiceSpecification::Document(_) => ServiceType::Document,
            ServiceSpecification::Tarpaulin(_) => ServiceType::Tarpaulin,
            ServiceSpecification::Lamination(_) => ServiceType::Lamination,
            ServiceSpecification::Standard(_) => ServiceType::Standard,
        }
    }

    /// The quantity an order line must carry for this specification.
    ///
    /// Copies for documents, quantity for lamination and standard services,
    /// and always 1 for a tarpaulin (the unit is the single tarp).
    pub const fn effective_quantity(&self) -> i64 {
        match self {
            ServiceSpecification::Document(spec) => spec.copies,
            ServiceSpecification::Tarpaulin(_) => 1,
            ServiceSpecification::Lamination(spec) => spec.quantity,
            ServiceSpecification::Standard(spec) => spec.quantity,
        }
    }

    /// Validates ranges. Called by the calculator before any arithmetic.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            ServiceSpecification::Document(spec) => spec.validate(),
            ServiceSpecification::Tarpaulin(spec) => spec.validate(),
            ServiceSpecification::Lamination(spec) => validate_quantity("quantity", spec.quantity),
            ServiceSpecification::Standard(spec) => validate_quantity("quantity", spec.quantity),
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// How the pages of a document are to be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ColorMode {
    Color,
    BlackAndWhite,
    /// Price each page by its detected color content.
    AutoDetect,
}

impl ColorMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Color => "Color",
            ColorMode::BlackAndWhite => "BlackAndWhite",
            ColorMode::AutoDetect => "AutoDetect",
        }
    }
}

/// Per-page color analysis of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub page_count: i64,
    pub color_pages: i64,
    pub bw_pages: i64,
}

impl PageAnalysis {
    fn validate(&self) -> ValidationResult<()> {
        for (field, value) in [
            ("pageAnalysis.pageCount", self.page_count),
            ("pageAnalysis.colorPages", self.color_pages),
            ("pageAnalysis.bwPages", self.bw_pages),
        ] {
            if value < 0 {
                return Err(ValidationError::MustNotBeNegative {
                    field: field.to_string(),
                });
            }
            if value > MAX_ITEM_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: MAX_ITEM_QUANTITY,
                });
            }
        }

        if self.color_pages + self.bw_pages != self.page_count {
            return Err(ValidationError::InvalidFormat {
                field: "pageAnalysis".to_string(),
                reason: format!(
                    "colorPages ({}) + bwPages ({}) must equal pageCount ({})",
                    self.color_pages, self.bw_pages, self.page_count
                ),
            });
        }

        Ok(())
    }
}

/// Printing / photocopy job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSpec {
    pub paper_size: String,
    /// Key into the rule set's paper-type surcharge table.
    pub paper_type: String,
    pub copies: i64,
    pub color_mode: ColorMode,
    pub page_analysis: Option<PageAnalysis>,
}

impl DocumentSpec {
    fn validate(&self) -> ValidationResult<()> {
        validate_quantity("copies", self.copies)?;

        for (field, value) in [("paperSize", &self.paper_size), ("paperType", &self.paper_type)] {
            if value.chars().count() > MAX_NAME_LENGTH {
                return Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max: MAX_NAME_LENGTH,
                });
            }
        }

        if let Some(analysis) = &self.page_analysis {
            analysis.validate()?;
        }

        Ok(())
    }
}

// =============================================================================
// Tarpaulin
// =============================================================================

/// Tarpaulin banner, sized in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TarpaulinSpec {
    pub width_ft: f64,
    pub height_ft: f64,
    #[serde(default)]
    pub eyelets: i64,
    #[serde(default)]
    pub include_rope: bool,
    #[serde(default)]
    pub include_stand: bool,
}

impl TarpaulinSpec {
    fn validate(&self) -> ValidationResult<()> {
        validate_dimension("widthFt", self.width_ft)?;
        validate_dimension("heightFt", self.height_ft)?;
        validate_eyelets("eyelets", self.eyelets)
    }
}

// =============================================================================
// Lamination
// =============================================================================

/// Lamination pouch sizes, spelled on the wire the way the shop labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LaminationSize {
    #[serde(rename = "ID Size")]
    IdSize,
    #[serde(rename = "Big ID")]
    BigId,
    A4,
    Long,
    A5,
}

impl LaminationSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LaminationSize::IdSize => "ID Size",
            LaminationSize::BigId => "Big ID",
            LaminationSize::A4 => "A4",
            LaminationSize::Long => "Long",
            LaminationSize::A5 => "A5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaminationSpec {
    pub size: LaminationSize,
    pub quantity: i64,
}

// =============================================================================
// Standard
// =============================================================================

/// Flat-priced service; only the quantity varies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StandardSpec {
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
