//! # Region Aggregation
//!
//! Builds the fast-track breakdown shown on the quote screen: how much of a
//! quote lands in regions eligible for fast-track provisioning, and how much
//! must go through the regular pay path.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fast-Track Aggregation                             │
//! │                                                                         │
//! │  pricing_requests[i] ──┐ region = configurations[i].region            │
//! │   + configurations[i]  │ total += request.total, count += config.count │
//! │                        │                                                │
//! │  pricing_lines[j] ─────┼──► RegionStats map ──┬──► fast_track bucket   │
//! │   region = meta.region │    (BTreeMap by id)  │    (eligible_regions)  │
//! │         or region      │                      │                         │
//! │   total += line.total  │                      └──► pay bucket          │
//! │                        │                           (ineligible_regions)│
//! │  instances[k] ─────────┘                                               │
//! │   count += 1                                                           │
//! │                                                                         │
//! │  Contributions are ADDITIVE: the order of records never matters.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{
    FastTrackSummary, IneligibleRegion, Instance, PricingConfiguration, PricingLine,
    PricingRequest,
};
use crate::PricingDefaults;

// =============================================================================
// Region Resolution
// =============================================================================

/// Reads a candidate region id from a record.
pub type RegionAccessor<T> = for<'a> fn(&'a T) -> Option<&'a str>;

/// Tries each accessor in order and returns the first non-empty region.
pub fn first_region<'a, T>(record: &'a T, accessors: &[RegionAccessor<T>]) -> Option<&'a str> {
    accessors
        .iter()
        .filter_map(|accessor| accessor(record))
        .find(|region| !region.is_empty())
}

const CONFIGURATION_REGION: &[RegionAccessor<PricingConfiguration>] = &[configuration_region];
const PRICING_LINE_REGION: &[RegionAccessor<PricingLine>] = &[line_meta_region, line_region];
const INSTANCE_REGION: &[RegionAccessor<Instance>] = &[instance_region];
const INELIGIBLE_REGION: &[RegionAccessor<IneligibleRegion>] = &[IneligibleRegion::region];

fn configuration_region(config: &PricingConfiguration) -> Option<&str> {
    config.region.as_deref()
}

fn line_meta_region(line: &PricingLine) -> Option<&str> {
    line.meta.as_ref()?.region.as_deref()
}

fn line_region(line: &PricingLine) -> Option<&str> {
    line.region.as_deref()
}

fn instance_region(instance: &Instance) -> Option<&str> {
    instance.region.as_deref()
}

// =============================================================================
// Region Stats
// =============================================================================

/// Running total and unit count for one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegionStats {
    pub total: Money,
    #[ts(type = "number")]
    pub count: u64,
}

impl RegionStats {
    fn add_total(&mut self, amount: Money) {
        self.total += amount;
    }

    fn add_count(&mut self, units: u64) {
        self.count = self.count.saturating_add(units);
    }
}

/// Stats keyed by region id. Ordered so that output is stable.
pub type RegionStatsMap = BTreeMap<String, RegionStats>;

/// A region's share summed across a list of region ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegionBucket {
    pub total: Money,
    #[ts(type = "number")]
    pub count: u64,
}

impl AddAssign<&RegionStats> for RegionBucket {
    fn add_assign(&mut self, stats: &RegionStats) {
        self.total += stats.total;
        self.count = self.count.saturating_add(stats.count);
    }
}

// =============================================================================
// Sources
// =============================================================================

/// The already-fetched collections that feed the stats map.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionSources<'a> {
    /// Paired by index with `pricing_requests`.
    pub configurations: &'a [PricingConfiguration],
    pub pricing_requests: &'a [PricingRequest],
    pub pricing_lines: &'a [PricingLine],
    pub instances: &'a [Instance],
}

/// Builds the per-region stats map.
///
/// A region appears in the map only if at least one record resolved to it.
/// Records without a region are skipped.
pub fn build_region_stats(sources: &RegionSources<'_>) -> RegionStatsMap {
    let mut stats = RegionStatsMap::new();

    for (index, request) in sources.pricing_requests.iter().enumerate() {
        let Some((config, region)) = configured_region(sources.configurations, index) else {
            trace!(index, "Pricing request has no configured region, skipping");
            continue;
        };

        let entry = stats.entry(region.to_string()).or_default();
        entry.add_total(request.total);
        entry.add_count(config.count);
    }

    for (index, line) in sources.pricing_lines.iter().enumerate() {
        let Some(region) = first_region(line, PRICING_LINE_REGION) else {
            trace!(index, "Pricing line has no region, skipping");
            continue;
        };
        stats.entry(region.to_string()).or_default().add_total(line.total);
    }

    for (index, instance) in sources.instances.iter().enumerate() {
        let Some(region) = first_region(instance, INSTANCE_REGION) else {
            trace!(index, "Instance has no region, skipping");
            continue;
        };
        stats.entry(region.to_string()).or_default().add_count(1);
    }

    stats
}

/// The configuration paired with request `index`, with its resolved region.
fn configured_region(
    configurations: &[PricingConfiguration],
    index: usize,
) -> Option<(&PricingConfiguration, &str)> {
    let config = configurations.get(index)?;
    Some((config, first_region(config, CONFIGURATION_REGION)?))
}

/// Sums the stats of the listed regions. Unknown regions add nothing.
///
/// Each listed id contributes once per occurrence.
pub fn sum_bucket<'a, I>(stats: &RegionStatsMap, regions: I) -> RegionBucket
where
    I: IntoIterator<Item = &'a str>,
{
    let mut bucket = RegionBucket::default();
    for region in regions {
        if let Some(region_stats) = stats.get(region) {
            bucket += region_stats;
        }
    }
    bucket
}

// =============================================================================
// Fast-Track Breakdown
// =============================================================================

/// Result of [`aggregate_fast_track`], rendered by the fast-track panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FastTrackBreakdown {
    pub eligible_regions: Vec<String>,
    pub ineligible_regions: Vec<IneligibleRegion>,
    pub fast_track: RegionBucket,
    pub pay: RegionBucket,
    pub currency: String,
}

/// Splits a quote into fast-track and pay buckets.
///
/// Returns `None` when there is no summary: the panel has nothing to show.
///
/// ## Example
/// ```rust
/// use nimbus_core::region::{aggregate_fast_track, RegionSources};
/// use nimbus_core::{
///     FastTrackSummary, IneligibleRegion, Money, PricingConfiguration, PricingDefaults,
///     PricingRequest,
/// };
///
/// let summary = FastTrackSummary {
///     eligible_regions: vec!["us-east".into()],
///     ineligible_regions: vec![IneligibleRegion::new("eu-west")],
///     currency: None,
/// };
/// let configurations = [PricingConfiguration { region: Some("us-east".into()), count: 2 }];
/// let requests = [PricingRequest { total: Money::from_cents(5000) }];
/// let sources = RegionSources {
///     configurations: &configurations,
///     pricing_requests: &requests,
///     ..Default::default()
/// };
///
/// let breakdown =
///     aggregate_fast_track(Some(&summary), &sources, &PricingDefaults::default()).unwrap();
/// assert_eq!(breakdown.fast_track.total, Money::from_cents(5000));
/// assert_eq!(breakdown.fast_track.count, 2);
/// assert!(breakdown.pay.total.is_zero());
/// assert_eq!(breakdown.currency, "USD");
/// ```
pub fn aggregate_fast_track(
    summary: Option<&FastTrackSummary>,
    sources: &RegionSources<'_>,
    defaults: &PricingDefaults,
) -> Option<FastTrackBreakdown> {
    let summary = summary?;
    let stats = build_region_stats(sources);

    let fast_track = sum_bucket(&stats, summary.eligible_regions.iter().map(String::as_str));
    let pay = sum_bucket(
        &stats,
        summary
            .ineligible_regions
            .iter()
            .filter_map(|entry| first_region(entry, INELIGIBLE_REGION)),
    );

    let currency = summary
        .currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(&defaults.currency)
        .to_string();

    debug!(
        regions = stats.len(),
        fast_track_total = %fast_track.total,
        fast_track_count = fast_track.count,
        pay_total = %pay.total,
        pay_count = pay.count,
        currency = %currency,
        "Fast-track breakdown computed"
    );

    Some(FastTrackBreakdown {
        eligible_regions: summary.eligible_regions.clone(),
        ineligible_regions: summary.ineligible_regions.clone(),
        fast_track,
        pay,
        currency,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
