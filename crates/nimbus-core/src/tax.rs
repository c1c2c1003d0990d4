//! # Tax Calculation
//!
//! Selects the tax rules that apply at a point in time and applies each one
//! to the subtotal.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rules ──► is_rule_effective(rule, at) ──► applicable rules (in order) │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │               amount = subtotal × rate / 100   (per rule)              │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │       total_tax = Σ amount        total = subtotal + total_tax         │
//! │                                                                         │
//! │  Every rule is applied to the SAME subtotal: no tax-on-tax.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Applicability
//! A rule applies at `t` when it is active, `effective_from <= t`, and
//! `effective_until` is absent or `>= t`. A date that cannot be parsed makes
//! the rule inapplicable; it never fails the calculation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use ts_rs::TS;

use crate::money::{Money, TaxRate};
use crate::types::{TaxLocation, TaxRule};

// =============================================================================
// Result Types
// =============================================================================

/// One applied rule in a [`TaxCalculation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedTaxRule {
    pub rule_id: String,
    pub rule_name: String,
    pub rate: TaxRate,
    pub amount: Money,
}

/// Taxes for a subtotal at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCalculation {
    pub subtotal: Money,
    /// Applicable rules, in input order.
    pub tax_rules: Vec<AppliedTaxRule>,
    pub total_tax: Money,
    pub total: Money,
}

// =============================================================================
// Effective Dates
// =============================================================================

/// Parses a rule date.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (or with a
/// space) timestamps read as UTC, and plain `YYYY-MM-DD` dates read as UTC
/// midnight.
pub fn parse_effective_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Returns true if `rule` applies at `at`.
pub fn is_rule_effective(rule: &TaxRule, at: DateTime<Utc>) -> bool {
    if !rule.is_active() {
        return false;
    }

    let Some(from) = rule.effective_from.as_deref().and_then(parse_effective_date) else {
        trace!(rule_id = %rule.id, "Tax rule has no parseable effective_from");
        return false;
    };
    if from > at {
        return false;
    }

    match rule
        .effective_until
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
    {
        None => true,
        Some(raw) => match parse_effective_date(raw) {
            Some(until) => until >= at,
            None => {
                trace!(rule_id = %rule.id, effective_until = raw, "Unparseable effective_until");
                false
            }
        },
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Applies every rule effective at `at` to `subtotal`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use nimbus_core::tax::calculate_tax;
/// use nimbus_core::{Money, TaxRate, TaxRule, TaxRuleStatus};
///
/// let rule = |id: &str, bps| TaxRule {
///     id: id.into(),
///     name: id.to_uppercase(),
///     rate: TaxRate::from_bps(bps),
///     status: TaxRuleStatus::Active,
///     country: "US".into(),
///     effective_from: Some("2024-01-01".into()),
///     ..Default::default()
/// };
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let calc = calculate_tax(Money::from_cents(10_000), &[rule("state", 500), rule("city", 1000)], at);
///
/// assert_eq!(calc.total_tax, Money::from_cents(1_500));
/// assert_eq!(calc.total, Money::from_cents(11_500));
/// assert_eq!(calc.tax_rules.len(), 2);
/// ```
pub fn calculate_tax<'a, I>(subtotal: Money, rules: I, at: DateTime<Utc>) -> TaxCalculation
where
    I: IntoIterator<Item = &'a TaxRule>,
{
    let tax_rules: Vec<AppliedTaxRule> = rules
        .into_iter()
        .filter(|rule| is_rule_effective(rule, at))
        .map(|rule| AppliedTaxRule {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            rate: rule.rate,
            amount: subtotal.apply_rate(rule.rate),
        })
        .collect();

    let total_tax: Money = tax_rules.iter().map(|applied| applied.amount).sum();
    let total = subtotal + total_tax;

    debug!(
        %subtotal,
        applied = tax_rules.len(),
        %total_tax,
        %total,
        "Tax calculated"
    );

    TaxCalculation {
        subtotal,
        tax_rules,
        total_tax,
        total,
    }
}

/// [`calculate_tax`] at the current instant.
pub fn calculate_tax_now<'a, I>(subtotal: Money, rules: I) -> TaxCalculation
where
    I: IntoIterator<Item = &'a TaxRule>,
{
    calculate_tax(subtotal, rules, Utc::now())
}

// =============================================================================
// Rule Selection
// =============================================================================

/// Active rules for a country (exact match).
pub fn get_tax_rules_by_country<'a>(rules: &'a [TaxRule], country: &str) -> Vec<&'a TaxRule> {
    rules
        .iter()
        .filter(|rule| rule.is_active() && rule.country == country)
        .collect()
}

/// Active rules that apply to a billing location.
///
/// A rule without a state (or city) applies to the whole country (or
/// state). A rule scoped to a state only matches a location in that state.
pub fn get_tax_rules_by_location<'a>(rules: &'a [TaxRule], location: &TaxLocation) -> Vec<&'a TaxRule> {
    rules
        .iter()
        .filter(|rule| {
            rule.is_active()
                && rule.country == location.country
                && scope_matches(rule.state.as_deref(), location.state.as_deref())
                && scope_matches(rule.city.as_deref(), location.city.as_deref())
        })
        .collect()
}

fn scope_matches(rule_scope: Option<&str>, location_scope: Option<&str>) -> bool {
    match rule_scope.filter(|scope| !scope.is_empty()) {
        None => true,
        Some(scope) => location_scope == Some(scope),
    }
}

/// Renders a rate as a two-decimal percentage: `"8.25%"`.
pub fn format_tax_rate(rate: TaxRate) -> String {
    rate.format()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRuleStatus;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn rule(id: &str, bps: u32, from: &str, until: Option<&str>) -> TaxRule {
        TaxRule {
            id: id.to_string(),
            name: format!("{id} tax"),
            rate: TaxRate::from_bps(bps),
            status: TaxRuleStatus::Active,
            country: "US".to_string(),
            state: None,
            city: None,
            effective_from: Some(from.to_string()),
            effective_until: until.map(str::to_string),
        }
    }

    #[test]
    fn test_two_rules_are_additive() {
        let rules = [rule("state", 500, "2025-01-01", None), rule("county", 1000, "2025-01-01", None)];
        let calc = calculate_tax(Money::from_cents(10_000), &rules, now());

        assert_eq!(calc.subtotal, Money::from_cents(10_000));
        assert_eq!(calc.total_tax, Money::from_cents(1_500));
        assert_eq!(calc.total, Money::from_cents(11_500));
        assert_eq!(calc.tax_rules.len(), 2);
        assert_eq!(calc.tax_rules[0].rule_id, "state");
        assert_eq!(calc.tax_rules[0].amount, Money::from_cents(500));
        assert_eq!(calc.tax_rules[1].rule_id, "county");
        assert_eq!(calc.tax_rules[1].amount, Money::from_cents(1_000));
        assert_eq!(calc.tax_rules[1].rule_name, "county tax");
    }

    #[test]
    fn test_effective_date_boundaries() {
        let tomorrow = rule("tomorrow", 500, "2025-06-16", None);
        let yesterday_open = rule("open", 500, "2025-06-14", None);
        let expired = rule("expired", 500, "2025-01-01", Some("2025-06-14"));

        assert!(!is_rule_effective(&tomorrow, now()));
        assert!(is_rule_effective(&yesterday_open, now()));
        assert!(!is_rule_effective(&expired, now()));
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let rule = rule("edge", 500, "2025-06-15", Some("2025-06-15"));
        assert!(is_rule_effective(&rule, at));
    }

    #[test]
    fn test_inactive_rule_is_excluded() {
        let mut inactive = rule("old", 500, "2020-01-01", None);
        inactive.status = TaxRuleStatus::Inactive;
        let calc = calculate_tax(Money::from_cents(10_000), [&inactive], now());
        assert!(calc.tax_rules.is_empty());
        assert_eq!(calc.total, Money::from_cents(10_000));
    }

    #[test]
    fn test_malformed_dates_exclude_the_rule() {
        let bad_from = rule("bad-from", 500, "next tuesday", None);
        let bad_until = rule("bad-until", 500, "2025-01-01", Some("31/12/2025"));
        let mut no_from = rule("no-from", 500, "", None);
        no_from.effective_from = None;

        let calc = calculate_tax(Money::from_cents(10_000), [&bad_from, &bad_until, &no_from], now());
        assert!(calc.tax_rules.is_empty());
        assert!(calc.total_tax.is_zero());
    }

    #[test]
    fn test_empty_until_is_open_ended() {
        let rule = rule("open", 500, "2025-01-01", Some(""));
        assert!(is_rule_effective(&rule, now()));
    }

    #[test]
    fn test_parse_effective_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_effective_date("2025-06-15"), Some(midnight));
        assert_eq!(parse_effective_date("2025-06-15T00:00:00Z"), Some(midnight));
        assert_eq!(parse_effective_date("2025-06-15T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_effective_date("2025-06-15T00:00:00"), Some(midnight));
        assert_eq!(parse_effective_date("2025-06-15 00:00:00"), Some(midnight));
        assert_eq!(parse_effective_date("2025-13-40"), None);
        assert_eq!(parse_effective_date(""), None);
    }

    #[test]
    fn test_no_cascading_tax() {
        let rules = [rule("a", 1000, "2025-01-01", None), rule("b", 1000, "2025-01-01", None)];
        let calc = calculate_tax(Money::from_cents(10_000), &rules, now());
        // 10% + 10% of 100.00, not 10% of 110.00
        assert_eq!(calc.total_tax, Money::from_cents(2_000));
    }

    #[test]
    fn test_fractional_rate_is_exact() {
        let rules = [rule("nyc", 0, "2025-01-01", None)];
        let mut rules = rules.to_vec();
        rules[0].rate = TaxRate::from_percentage(Decimal::new(8875, 3));
        let calc = calculate_tax(Money::from_cents(1_999), &rules, now());
        assert_eq!(calc.total_tax.amount(), Decimal::new(17_741_125, 7));
        assert_eq!(calc.total_tax.to_string(), "1.77");
    }

    #[test]
    fn test_rules_by_country() {
        let mut de = rule("vat", 1900, "2025-01-01", None);
        de.country = "DE".to_string();
        let mut inactive_de = de.clone();
        inactive_de.id = "old-vat".to_string();
        inactive_de.status = TaxRuleStatus::Inactive;
        let us = rule("sales", 500, "2025-01-01", None);
        let rules = vec![de, inactive_de, us];

        let found = get_tax_rules_by_country(&rules, "DE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "vat");
        assert!(get_tax_rules_by_country(&rules, "de").is_empty());
    }

    #[test]
    fn test_rules_by_location() {
        let federal = rule("federal", 100, "2025-01-01", None);
        let mut texas = rule("texas", 625, "2025-01-01", None);
        texas.state = Some("TX".to_string());
        let mut austin = rule("austin", 200, "2025-01-01", None);
        austin.state = Some("TX".to_string());
        austin.city = Some("Austin".to_string());
        let rules = vec![federal, texas, austin];

        let ids = |location: &TaxLocation| -> Vec<String> {
            get_tax_rules_by_location(&rules, location)
                .into_iter()
                .map(|r| r.id.clone())
                .collect()
        };

        assert_eq!(ids(&TaxLocation::country("US")), vec!["federal"]);

        let mut dallas = TaxLocation::country("US");
        dallas.state = Some("TX".to_string());
        dallas.city = Some("Dallas".to_string());
        assert_eq!(ids(&dallas), vec!["federal", "texas"]);

        dallas.city = Some("Austin".to_string());
        assert_eq!(ids(&dallas), vec!["federal", "texas", "austin"]);
    }

    #[test]
    fn test_format_tax_rate() {
        assert_eq!(format_tax_rate(TaxRate::from_bps(1000)), "10.00%");
        assert_eq!(format_tax_rate(TaxRate::from_bps(825)), "8.25%");
    }
}
