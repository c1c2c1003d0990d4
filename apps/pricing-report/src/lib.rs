//! # pricing-report
//!
//! Offline reports over console snapshots: the fast-track breakdown, a tax
//! calculation, and an admin check of tax rules.
//!
//! ## Modules
//!
//! - [`config`] - TOML + environment configuration
//! - [`snapshot`] - Snapshot file loading
//! - [`report`] - Report builders and JSON rendering
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod report;
pub mod snapshot;

pub use config::ReportConfig;
pub use error::{ReportError, ReportResult};
pub use snapshot::Snapshot;
