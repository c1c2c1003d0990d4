//! # Report Error Types
//!
//! Errors raised while loading configuration and snapshots.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Report Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Snapshot     │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  SnapshotRead   │  │  Core (nimbus-core)     │ │
//! │  │  ConfigLoad     │  │  SnapshotParse  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use nimbus_core::CoreError;
use thiserror::Error;

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A loaded setting has an unusable value.
    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    #[error("Failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not a JSON object of the expected shape.
    #[error("Failed to parse snapshot {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Output / Domain Errors
    // =========================================================================
    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(err: toml::de::Error) -> Self {
        ReportError::ConfigLoadFailed(err.to_string())
    }
}
