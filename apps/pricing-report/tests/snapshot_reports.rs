//! End-to-end reports over snapshot and config files on disk.

use std::io::Write;

use chrono::{TimeZone, Utc};
use nimbus_core::{Money, RegionBucket};
use pricing_report::report::{self, TaxOptions};
use pricing_report::{ReportConfig, ReportError, Snapshot};
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{
    "summary": {
        "eligible_regions": ["us-east"],
        "ineligible_regions": [{"region": "eu-west"}],
        "currency": null
    },
    "configurations": [{"region": "us-east", "count": 2}, {"region": "eu-west", "count": 1}],
    "pricing_requests": [{"total": 50}, {"total": "25.50"}],
    "pricing_lines": [{"total": 10, "region": "us-east", "meta": {"region": "eu-west"}}],
    "instances": [{"region": "us-east"}, {"region": "eu-west"}, {}],
    "subtotal": 100,
    "location": {"country": "US", "state": "TX"},
    "tax_rules": [
        {"id": 1, "name": "Federal", "rate": 5, "status": "active",
         "country": "US", "effective_from": "2024-01-01"},
        {"id": 2, "name": "Texas", "rate": 10, "status": "active",
         "country": "US", "state": "TX", "effective_from": "2024-01-01"},
        {"id": 3, "name": "Quebec", "rate": 9.975, "status": "active",
         "country": "CA", "effective_from": "2024-01-01"}
    ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn fast_track_report_from_file() {
    let file = write_temp(SNAPSHOT);
    let snapshot = Snapshot::from_path(file.path()).unwrap();
    let config = ReportConfig::default();

    let breakdown = report::fast_track_report(&snapshot, &config.pricing_defaults().unwrap()).unwrap();

    // us-east: request 50.00 x2 configs + one instance
    assert_eq!(
        breakdown.fast_track,
        RegionBucket {
            total: Money::from_cents(5_000),
            count: 3
        }
    );
    // eu-west: request 25.50 + line 10.00 (meta region wins) + one instance
    assert_eq!(
        breakdown.pay,
        RegionBucket {
            total: Money::from_cents(3_550),
            count: 2
        }
    );
    assert_eq!(breakdown.currency, "USD");
}

#[test]
fn tax_report_with_location_from_snapshot() {
    let file = write_temp(SNAPSHOT);
    let snapshot = Snapshot::from_path(file.path()).unwrap();

    let calc = report::tax_report(
        &snapshot,
        &TaxOptions {
            subtotal: None,
            at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            location: snapshot.location.clone(),
        },
    );

    assert_eq!(calc.tax_rules.len(), 2);
    assert_eq!(calc.total_tax, Money::from_cents(1_500));
    assert_eq!(calc.total, Money::from_cents(11_500));
}

#[test]
fn tax_report_without_location_uses_every_rule() {
    let file = write_temp(SNAPSHOT);
    let snapshot = Snapshot::from_path(file.path()).unwrap();

    let calc = report::tax_report(
        &snapshot,
        &TaxOptions {
            subtotal: Some(Money::from_cents(1_000)),
            at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            location: None,
        },
    );

    assert_eq!(calc.tax_rules.len(), 3);
    assert_eq!(calc.total_tax.to_string(), "2.50");
}

#[test]
fn missing_snapshot_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Snapshot::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ReportError::SnapshotRead { .. }));
}

#[test]
fn malformed_snapshot_is_a_parse_error() {
    let file = write_temp("{ not json");
    let err = Snapshot::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ReportError::SnapshotParse { .. }));
}

#[test]
fn config_file_is_read() {
    let file = write_temp(
        "[pricing]\ndefault_currency = \"EUR\"\n\n[tax]\ncountry = \"US\"\nstate = \"TX\"\n\n[output]\npretty = false\n",
    );

    let config = ReportConfig::from_file(Some(file.path().to_path_buf())).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.pricing.default_currency, "EUR");
    assert!(!config.output.pretty);
    assert_eq!(config.output.log_level, "info");

    let location = config.tax_location().unwrap();
    assert_eq!(location.country, "US");
    assert_eq!(location.state.as_deref(), Some("TX"));
}

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReportConfig::from_file(Some(dir.path().join("pricing-report.toml"))).unwrap();
    assert_eq!(config, ReportConfig::default());
}

#[test]
fn invalid_config_values_fail_validation() {
    let file = write_temp("[output]\nlog_level = \"loud\"\n");
    let config = ReportConfig::from_file(Some(file.path().to_path_buf())).unwrap();
    assert!(matches!(config.validate(), Err(ReportError::InvalidConfig(_))));

    let file = write_temp("[pricing\n");
    assert!(matches!(
        ReportConfig::from_file(Some(file.path().to_path_buf())),
        Err(ReportError::ConfigLoadFailed(_))
    ));
}

#[test]
fn malformed_rule_is_skipped_and_siblings_still_apply() {
    let file = write_temp(
        r#"{
            "subtotal": 100,
            "configurations": null,
            "tax_rules": [
                {"id": 1, "name": "Federal", "rate": 5, "status": "active",
                 "country": "US", "effective_from": "2024-01-01"},
                {"id": 2, "name": "Broken", "rate": 10, "status": "active",
                 "country": "US", "effective_from": 20240101},
                {"id": 3, "name": null, "rate": 10, "status": null,
                 "country": null, "effective_from": "2024-01-01"}
            ]
        }"#,
    );
    let snapshot = Snapshot::from_path(file.path()).unwrap();

    let calc = report::tax_report(
        &snapshot,
        &TaxOptions {
            at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        },
    );

    assert_eq!(calc.tax_rules.len(), 1);
    assert_eq!(calc.tax_rules[0].rule_id, "1");
    assert_eq!(calc.total, Money::from_cents(10_500));

    let checked = report::check_rules(&snapshot.tax_rules);
    assert_eq!(checked.problems.len(), 2);
}
