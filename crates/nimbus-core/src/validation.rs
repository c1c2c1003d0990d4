//! # Validation Module
//!
//! Admin-side validation for tax rules and console identifiers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console forms (TypeScript)                                   │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Tax rule shape (rate range, effective window)                     │
//! │  └── Currency code format                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Calculation (tax.rs / region.rs)                                      │
//! │  └── Never validates: bad input degrades to a neutral value            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nimbus_core::validation::validate_currency_code;
//!
//! assert!(validate_currency_code("USD").is_ok());
//! assert!(validate_currency_code("usd").is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::tax::parse_effective_date;
use crate::types::TaxRule;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest tax rule name the admin form accepts.
pub const MAX_RULE_NAME_LEN: usize = 100;

// =============================================================================
// Currency Validators
// =============================================================================

/// Validates an ISO 4217-shaped currency code (three uppercase letters).
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be three uppercase letters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Tax Rule Validators
// =============================================================================

/// Validates a tax rate percentage (0 to 100 inclusive).
pub fn validate_tax_rate(rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Checks every field of a tax rule, returning the first problem found.
///
/// ## Rules
/// - `id`, `name` and `country` are required
/// - `name` is at most 100 characters
/// - `rate` is within 0..=100
/// - `effective_from` is required and parseable
/// - `effective_until`, when set, is parseable and not before `effective_from`
pub fn check_tax_rule(rule: &TaxRule) -> ValidationResult<()> {
    require("id", &rule.id)?;
    require("name", &rule.name)?;

    if rule.name.trim().chars().count() > MAX_RULE_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_RULE_NAME_LEN,
        });
    }

    require("country", &rule.country)?;
    validate_tax_rate(rule.rate.percentage())?;

    let raw_from = rule.effective_from.as_deref().unwrap_or_default();
    require("effective_from", raw_from)?;
    let from = parse_date("effective_from", raw_from)?;

    if let Some(raw_until) = rule
        .effective_until
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
    {
        let until = parse_date("effective_until", raw_until)?;
        if until < from {
            return Err(ValidationError::InvertedWindow {
                from: raw_from.to_string(),
                until: raw_until.to_string(),
            });
        }
    }

    Ok(())
}

/// Like [`check_tax_rule`], wrapping the problem with the rule id.
pub fn validate_tax_rule(rule: &TaxRule) -> CoreResult<()> {
    check_tax_rule(rule).map_err(|source| CoreError::InvalidTaxRule {
        rule_id: rule.id.clone(),
        source,
    })
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn parse_date(field: &str, raw: &str) -> ValidationResult<chrono::DateTime<chrono::Utc>> {
    parse_effective_date(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{raw}' is not a date (expected YYYY-MM-DD or RFC 3339)"),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
