//! # nimbus-core: Pure Pricing Logic for the Nimbus Console
//!
//! This crate holds the only pieces of the console with real domain logic:
//! fast-track regional pricing aggregation and tax calculation. Everything is
//! a pure function over data the console has already fetched.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Nimbus Console Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Console SPA (admin / tenant / client)            │   │
//! │  │   Quote screen ──► Fast-track panel ──► Invoice preview         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ already-fetched collections            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ nimbus-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  region   │  │    tax    │  │   │
//! │  │   │  TaxRule  │  │   Money   │  │ Aggregate │  │ Calculate │  │   │
//! │  │   │  Records  │  │  TaxRate  │  │  Buckets  │  │  Filters  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO HTTP • NO GLOBAL STATE • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Input records (pricing requests, lines, instances, tax rules)
//! - [`money`] - Exact decimal `Money` and `TaxRate`
//! - [`lenient`] - Numeric coercion that degrades to zero
//! - [`region`] - Per-region stats and fast-track/pay buckets
//! - [`tax`] - Tax rule applicability and calculation
//! - [`validation`] - Admin-side validation of rules and identifiers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use nimbus_core::tax::calculate_tax;
//! use nimbus_core::{Money, TaxRate, TaxRule, TaxRuleStatus};
//!
//! let rule = TaxRule {
//!     id: "vat".into(),
//!     name: "VAT".into(),
//!     rate: TaxRate::from_bps(1000),
//!     status: TaxRuleStatus::Active,
//!     country: "DE".into(),
//!     state: None,
//!     city: None,
//!     effective_from: Some("2024-01-01".into()),
//!     effective_until: None,
//! };
//!
//! let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
//! let calc = calculate_tax(Money::from_cents(10_000), &[rule], at);
//! assert_eq!(calc.total, Money::from_cents(11_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lenient;
pub mod money;
pub mod region;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use region::{aggregate_fast_track, FastTrackBreakdown, RegionBucket, RegionSources, RegionStats};
pub use tax::{calculate_tax, AppliedTaxRule, TaxCalculation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when neither the summary nor the caller names one.
pub const FALLBACK_CURRENCY: &str = "USD";

/// Caller-supplied defaults threaded into the aggregation.
///
/// The console keeps one of these per tenant; the report CLI builds it from
/// its configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingDefaults {
    /// Currency reported when the fast-track summary does not carry one.
    pub currency: String,
}

impl PricingDefaults {
    /// Creates defaults after checking the currency code shape.
    pub fn new(currency: impl Into<String>) -> CoreResult<Self> {
        let currency = currency.into();
        validation::validate_currency_code(&currency)?;
        Ok(PricingDefaults { currency })
    }
}

impl Default for PricingDefaults {
    fn default() -> Self {
        PricingDefaults {
            currency: FALLBACK_CURRENCY.to_string(),
        }
    }
}
