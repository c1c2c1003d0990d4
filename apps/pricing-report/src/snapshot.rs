//! Snapshot files: console collections already fetched from the backend,
//! saved as one JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use nimbus_core::lenient;
use nimbus_core::region::RegionSources;
use nimbus_core::{
    FastTrackSummary, Instance, Money, PricingConfiguration, PricingLine, PricingRequest,
    TaxLocation, TaxRule,
};

use crate::error::{ReportError, ReportResult};

/// Every field is optional; a missing or `null` collection is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub summary: Option<FastTrackSummary>,
    #[serde(deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub configurations: Vec<PricingConfiguration>,
    #[serde(deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub pricing_requests: Vec<PricingRequest>,
    #[serde(deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub pricing_lines: Vec<PricingLine>,
    #[serde(deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub instances: Vec<Instance>,
    #[serde(deserialize_with = "lenient::deserialize_vec_or_empty")]
    pub tax_rules: Vec<TaxRule>,
    pub subtotal: Money,
    pub location: Option<TaxLocation>,
}

impl Snapshot {
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::SnapshotRead {
            path: PathBuf::from(path),
            source,
        })?;
        let snapshot = Self::from_json(&contents).map_err(|source| ReportError::SnapshotParse {
            path: PathBuf::from(path),
            source,
        })?;

        debug!(
            ?path,
            configurations = snapshot.configurations.len(),
            pricing_requests = snapshot.pricing_requests.len(),
            pricing_lines = snapshot.pricing_lines.len(),
            instances = snapshot.instances.len(),
            tax_rules = snapshot.tax_rules.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Borrows the collections the fast-track aggregation reads.
    pub fn sources(&self) -> RegionSources<'_> {
        RegionSources {
            configurations: &self.configurations,
            pricing_requests: &self.pricing_requests,
            pricing_lines: &self.pricing_lines,
            instances: &self.instances,
        }
    }
}
