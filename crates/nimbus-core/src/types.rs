//! # Domain Types
//!
//! Input records the console has already fetched from the REST backend.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Fast-track inputs                         Tax inputs                   │
//! │  ┌──────────────────────┐                  ┌──────────────────────┐     │
//! │  │  FastTrackSummary    │                  │  TaxRule             │     │
//! │  │  eligible_regions    │                  │  rate (TaxRate)      │     │
//! │  │  ineligible_regions  │                  │  status              │     │
//! │  │  currency            │                  │  country/state/city  │     │
//! │  └──────────────────────┘                  │  effective window    │     │
//! │  ┌──────────────────────┐                  └──────────────────────┘     │
//! │  │ PricingConfiguration │ ◄─ paired by index ─┐                         │
//! │  │ region, count        │                     │                         │
//! │  └──────────────────────┘   ┌─────────────────┴────┐                    │
//! │  ┌──────────────────────┐   │  PricingRequest      │                    │
//! │  │  PricingLine         │   │  total               │                    │
//! │  │  meta.region, region │   └──────────────────────┘                    │
//! │  │  total               │   ┌──────────────────────┐                    │
//! │  └──────────────────────┘   │  Instance  (region)  │                    │
//! │                             └──────────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every field is optional on the wire. Numeric fields go through
//! [`crate::lenient`] so a malformed value reads as zero instead of failing
//! the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::lenient;
use crate::money::{Money, TaxRate};

// =============================================================================
// Fast-Track Summary
// =============================================================================

/// Backend summary naming which regions qualify for fast-track.
///
/// `eligible_regions` is a list of bare region ids while
/// `ineligible_regions` is a list of records carrying a `region` field. The
/// backend ships them in these two shapes and both are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FastTrackSummary {
    #[serde(default, deserialize_with = "lenient::deserialize_identifiers")]
    pub eligible_regions: Vec<String>,

    #[serde(default, deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub ineligible_regions: Vec<IneligibleRegion>,

    /// Currency of the quote, when the backend sets it.
    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub currency: Option<String>,
}

/// One entry of `ineligible_regions`.
///
/// Entries are expected to be records with a `region` field. Anything else
/// (a bare string, a number) is kept verbatim and resolves to no region, so
/// it contributes nothing to the pay bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum IneligibleRegion {
    Record(IneligibleRegionRecord),
    Other(#[ts(type = "unknown")] Value),
}

impl IneligibleRegion {
    /// Creates a record entry for a region with no extra attributes.
    pub fn new(region: impl Into<String>) -> Self {
        IneligibleRegion::Record(IneligibleRegionRecord {
            region: Some(region.into()),
            extra: Map::new(),
        })
    }

    /// The `region` field of a record entry.
    pub fn region(&self) -> Option<&str> {
        match self {
            IneligibleRegion::Record(record) => record.region.as_deref(),
            IneligibleRegion::Other(_) => None,
        }
    }
}

/// An entry with no region.
impl Default for IneligibleRegion {
    fn default() -> Self {
        IneligibleRegion::Other(Value::Null)
    }
}

/// Record form of an `ineligible_regions` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IneligibleRegionRecord {
    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub region: Option<String>,

    /// Whatever else the backend attached (reason, label, ...), echoed back.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Pricing Records
// =============================================================================

/// A requested configuration on the quote screen.
///
/// Paired by position with [`PricingRequest`]: `configurations[i]` supplies
/// the region and unit count for `pricing_requests[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfiguration {
    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub region: Option<String>,

    /// Units requested; zero when missing, negative or non-numeric.
    #[serde(default, deserialize_with = "lenient::deserialize_count")]
    #[ts(type = "number")]
    pub count: u64,
}

/// Priced result of one configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingRequest {
    #[serde(default)]
    pub total: Money,
}

/// A priced line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingLine {
    #[serde(default)]
    pub total: Money,

    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub region: Option<String>,

    #[serde(default)]
    pub meta: Option<PricingLineMeta>,
}

/// Metadata attached to a pricing line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingLineMeta {
    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub region: Option<String>,
}

/// A running instance; each one counts as a single unit in its region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Instance {
    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub region: Option<String>,
}

// =============================================================================
// Tax Rules
// =============================================================================

/// Lifecycle status of a tax rule.
///
/// Anything the backend sends other than `"active"` reads as inactive,
/// including `null` and non-string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxRuleStatus {
    Active,
    #[default]
    Inactive,
}

impl<'de> Deserialize<'de> for TaxRuleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(status) if status == "active" => Ok(TaxRuleStatus::Active),
            _ => Ok(TaxRuleStatus::Inactive),
        }
    }
}

/// A time-bounded, location-scoped tax percentage.
///
/// Effective dates stay as the backend sent them. A date that does not parse
/// makes the rule inapplicable rather than failing the calculation, see
/// [`crate::tax::is_rule_effective`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRule {
    #[serde(default, deserialize_with = "lenient::deserialize_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::deserialize_string")]
    pub name: String,

    #[serde(default)]
    pub rate: TaxRate,

    #[serde(default)]
    pub status: TaxRuleStatus,

    #[serde(default, deserialize_with = "lenient::deserialize_string")]
    pub country: String,

    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub city: Option<String>,

    /// `YYYY-MM-DD` or RFC 3339. Non-string values are kept as JSON text.
    #[serde(default, deserialize_with = "lenient::deserialize_date_text")]
    pub effective_from: Option<String>,

    /// Open-ended when absent or empty.
    #[serde(default, deserialize_with = "lenient::deserialize_date_text")]
    pub effective_until: Option<String>,
}

impl TaxRule {
    /// Returns true if the rule's status is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == TaxRuleStatus::Active
    }
}

/// Where a charge is billed, for location-scoped rule selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLocation {
    #[serde(default, deserialize_with = "lenient::deserialize_string")]
    pub country: String,

    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "lenient::deserialize_optional_string")]
    pub city: Option<String>,
}

impl TaxLocation {
    /// A country-wide location.
    pub fn country(country: impl Into<String>) -> Self {
        TaxLocation {
            country: country.into(),
            state: None,
            city: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
