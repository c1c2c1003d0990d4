//! # Report Configuration
//!
//! Configuration for the pricing report CLI.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NIMBUS_DEFAULT_CURRENCY=EUR                                        │
//! │     NIMBUS_TAX_COUNTRY=DE                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <PATH>, or                                                │
//! │     ~/.config/console/pricing-report.toml (Linux)                      │
//! │     ~/Library/Application Support/com.nimbus.console/... (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, info, pretty output                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricing-report.toml
//! [pricing]
//! default_currency = "USD"
//!
//! [tax]
//! country = "US"  # optional: only consider rules for this billing country
//!
//! [output]
//! pretty = true
//! log_level = "info"  # trace | debug | info | warn | error
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use nimbus_core::validation::validate_currency_code;
use nimbus_core::{PricingDefaults, TaxLocation, FALLBACK_CURRENCY};

use crate::error::{ReportError, ReportResult};

/// Levels accepted by `output.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// =============================================================================
// Pricing Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Currency reported when the fast-track summary carries none.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_currency() -> String {
    FALLBACK_CURRENCY.to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            default_currency: default_currency(),
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// Billing location used to pre-filter tax rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub city: Option<String>,
}

impl TaxSettings {
    /// The configured location, if a country is set.
    pub fn location(&self) -> Option<TaxLocation> {
        let country = self.country.as_deref().filter(|c| !c.is_empty())?;
        Some(TaxLocation {
            country: country.to_string(),
            state: self.state.clone(),
            city: self.city.clone(),
        })
    }
}

// =============================================================================
// Output Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Pretty-print JSON reports.
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            pretty: default_true(),
            log_level: default_log_level(),
        }
    }
}

// =============================================================================
// Main Report Configuration
// =============================================================================

/// Complete report configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub tax: TaxSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl ReportConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing-report.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ReportResult<Self> {
        let mut config = Self::from_file(config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reads the TOML file only. A missing file yields the defaults.
    pub fn from_file(config_path: Option<PathBuf>) -> ReportResult<Self> {
        let Some(path) = config_path.or_else(Self::default_config_path) else {
            return Ok(Self::default());
        };

        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading report config from file");
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ReportResult<()> {
        validate_currency_code(&self.pricing.default_currency).map_err(|e| {
            ReportError::InvalidConfig(format!("pricing.default_currency: {e}"))
        })?;

        if !LOG_LEVELS.contains(&self.output.log_level.as_str()) {
            return Err(ReportError::InvalidConfig(format!(
                "Unknown log level: '{}'. Valid options: {}",
                self.output.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if let Some(country) = &self.tax.country {
            if country.trim().is_empty() {
                return Err(ReportError::InvalidConfig(
                    "tax.country must not be empty when set".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(currency) = lookup("NIMBUS_DEFAULT_CURRENCY") {
            debug!(currency = %currency, "Overriding default currency from environment");
            self.pricing.default_currency = currency;
        }

        if let Some(level) = lookup("NIMBUS_LOG_LEVEL") {
            self.output.log_level = level.to_lowercase();
        }

        if let Some(country) = lookup("NIMBUS_TAX_COUNTRY") {
            debug!(country = %country, "Overriding tax country from environment");
            self.tax.country = Some(country);
        }

        if let Some(pretty) = lookup("NIMBUS_PRETTY_OUTPUT") {
            match pretty.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.output.pretty = true,
                "0" | "false" | "no" => self.output.pretty = false,
                _ => warn!(value = %pretty, "Unknown NIMBUS_PRETTY_OUTPUT value in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "nimbus", "console")
            .map(|dirs| dirs.config_dir().join("pricing-report.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Defaults handed to the aggregation.
    pub fn pricing_defaults(&self) -> ReportResult<PricingDefaults> {
        Ok(PricingDefaults::new(self.pricing.default_currency.clone())?)
    }

    pub fn tax_location(&self) -> Option<TaxLocation> {
        self.tax.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.pricing.default_currency, "USD");
        assert_eq!(config.output.log_level, "info");
        assert!(config.output.pretty);
        assert!(config.tax_location().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ReportConfig = toml::from_str("[tax]\ncountry = \"DE\"\n").unwrap();
        assert_eq!(config.pricing.default_currency, "USD");
        assert_eq!(config.tax_location(), Some(TaxLocation::country("DE")));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ReportConfig::default();
        config.pricing.default_currency = "usd".to_string();
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.output.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.tax.country = Some(" ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ReportConfig::default();
        config.apply_overrides(lookup(&[
            ("NIMBUS_DEFAULT_CURRENCY", "EUR"),
            ("NIMBUS_LOG_LEVEL", "DEBUG"),
            ("NIMBUS_TAX_COUNTRY", "FR"),
            ("NIMBUS_PRETTY_OUTPUT", "false"),
        ]));

        assert_eq!(config.pricing.default_currency, "EUR");
        assert_eq!(config.output.log_level, "debug");
        assert_eq!(config.tax.country.as_deref(), Some("FR"));
        assert!(!config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_pretty_value_is_ignored() {
        let mut config = ReportConfig::default();
        config.apply_overrides(lookup(&[("NIMBUS_PRETTY_OUTPUT", "sometimes")]));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_pricing_defaults() {
        let mut config = ReportConfig::default();
        config.pricing.default_currency = "GBP".to_string();
        assert_eq!(config.pricing_defaults().unwrap().currency, "GBP");
    }
}
