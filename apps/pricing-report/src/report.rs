//! # Reports
//!
//! Glue between a loaded [`Snapshot`] and the nimbus-core calculations.
//! Each report is a serializable value; `main` only renders it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nimbus_core::region::aggregate_fast_track;
use nimbus_core::tax::{calculate_tax, get_tax_rules_by_location};
use nimbus_core::validation::check_tax_rule;
use nimbus_core::{FastTrackBreakdown, Money, PricingDefaults, TaxCalculation, TaxLocation, TaxRule};

use crate::error::ReportResult;
use crate::snapshot::Snapshot;

// =============================================================================
// Fast-Track
// =============================================================================

/// `None` when the snapshot has no fast-track summary.
pub fn fast_track_report(snapshot: &Snapshot, defaults: &PricingDefaults) -> Option<FastTrackBreakdown> {
    aggregate_fast_track(snapshot.summary.as_ref(), &snapshot.sources(), defaults)
}

// =============================================================================
// Tax
// =============================================================================

/// Options for [`tax_report`].
#[derive(Debug, Clone, Default)]
pub struct TaxOptions {
    /// Overrides the snapshot's subtotal.
    pub subtotal: Option<Money>,
    /// Evaluation instant; now when unset.
    pub at: Option<DateTime<Utc>>,
    /// Restricts rules to a billing location before the calculation.
    pub location: Option<TaxLocation>,
}

pub fn tax_report(snapshot: &Snapshot, options: &TaxOptions) -> TaxCalculation {
    let subtotal = options.subtotal.unwrap_or(snapshot.subtotal);
    let at = options.at.unwrap_or_else(Utc::now);

    match &options.location {
        Some(location) => {
            let rules = get_tax_rules_by_location(&snapshot.tax_rules, location);
            debug!(
                country = %location.country,
                matched = rules.len(),
                total = snapshot.tax_rules.len(),
                "Filtered tax rules by location"
            );
            calculate_tax(subtotal, rules, at)
        }
        None => calculate_tax(subtotal, &snapshot.tax_rules, at),
    }
}

// =============================================================================
// Rule Check
// =============================================================================

/// One invalid tax rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProblem {
    pub rule_id: String,
    pub rule_name: String,
    pub problem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCheckReport {
    pub checked: usize,
    pub problems: Vec<RuleProblem>,
}

impl RuleCheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validates every rule and collects the first problem of each.
pub fn check_rules(rules: &[TaxRule]) -> RuleCheckReport {
    let problems: Vec<RuleProblem> = rules
        .iter()
        .filter_map(|rule| {
            check_tax_rule(rule).err().map(|err| {
                warn!(rule_id = %rule.id, error = %err, "Invalid tax rule");
                RuleProblem {
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    problem: err.to_string(),
                }
            })
        })
        .collect();

    RuleCheckReport {
        checked: rules.len(),
        problems,
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render<T: Serialize>(report: &T, pretty: bool) -> ReportResult<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(rendered)
}
