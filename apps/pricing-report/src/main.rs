//! # pricing-report CLI Entry Point
//!
//! Loads configuration, installs logging, and dispatches subcommands.
//! Reports go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nimbus_core::{Money, PricingDefaults};
use pricing_report::report::{self, TaxOptions};
use pricing_report::{ReportConfig, Snapshot};

/// Pricing reports for Nimbus console snapshots.
#[derive(Parser, Debug)]
#[command(name = "pricing-report", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a quote into fast-track and pay buckets.
    FastTrack {
        snapshot: PathBuf,
        /// Currency used when the summary carries none.
        #[arg(long)]
        currency: Option<String>,
    },
    /// Calculate taxes for a subtotal.
    Tax {
        snapshot: PathBuf,
        /// Overrides the snapshot's subtotal.
        #[arg(long)]
        subtotal: Option<Decimal>,
        /// Evaluation instant (RFC 3339), defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Validate every tax rule in the snapshot.
    CheckRules { snapshot: PathBuf },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = ReportConfig::load(cli.config.clone()).context("loading configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.output.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let pretty = config.output.pretty;

    match cli.command {
        Commands::FastTrack { snapshot, currency } => {
            let snapshot = load(&snapshot)?;
            let defaults = match currency {
                Some(code) => PricingDefaults::new(code).context("invalid --currency")?,
                None => config.pricing_defaults()?,
            };
            let breakdown = report::fast_track_report(&snapshot, &defaults);
            println!("{}", report::render(&breakdown, pretty)?);
        }
        Commands::Tax {
            snapshot,
            subtotal,
            at,
        } => {
            let snapshot = load(&snapshot)?;
            let options = TaxOptions {
                subtotal: subtotal.map(Money::new),
                at,
                location: config.tax_location().or_else(|| snapshot.location.clone()),
            };
            let calculation = report::tax_report(&snapshot, &options);
            println!("{}", report::render(&calculation, pretty)?);
        }
        Commands::CheckRules { snapshot } => {
            let snapshot = load(&snapshot)?;
            let checked = report::check_rules(&snapshot.tax_rules);
            println!("{}", report::render(&checked, pretty)?);
            if !checked.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load(path: &Path) -> anyhow::Result<Snapshot> {
    info!(?path, "Reading snapshot");
    Ok(Snapshot::from_path(path)?)
}
