//! # Error Types
//!
//! Domain-specific error types for nimbus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  nimbus-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Admin input validation failures                │
//! │                                                                         │
//! │  pricing-report errors (separate crate)                                │
//! │  └── ReportError      - Config, snapshot and output failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ReportError → exit status         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The aggregation and tax calculation never produce these: malformed input
//! there degrades to a neutral value. Errors only come from the explicit
//! validation entry points.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A tax rule failed admin-side validation.
    #[error("Tax rule {rule_id} is invalid: {source}")]
    InvalidTaxRule {
        rule_id: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparsable date, bad currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Effective window ends before it starts.
    #[error("effective_until ({until}) is before effective_from ({from})")]
    InvertedWindow { from: String, until: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "rate must be between 0 and 100");
    }

    #[test]
    fn test_invalid_rule_message_names_rule() {
        let err = CoreError::InvalidTaxRule {
            rule_id: "vat-de".to_string(),
            source: ValidationError::Required {
                field: "country".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Tax rule vat-de is invalid: country is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
