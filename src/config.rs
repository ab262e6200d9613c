//! Configuration management and validation.
//!
//! Provides the converter configuration with defaults, environment variable
//! overrides and builder-style setters used by the CLI.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::constants::{
    DEFAULT_HIGH_CONSUMPTION_THRESHOLD, DEFAULT_PROGRESS_LOG_INTERVAL, DEFAULT_TABLE_NAME,
    env_vars,
};
use crate::{Error, Result};

/// Settings for a single NEM12 to SQL conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Target table for generated INSERT statements
    pub table_name: String,

    /// Consumption values above this are reported as suspicious warnings
    pub high_consumption_threshold: Decimal,

    /// Number of readings between progress log lines
    pub progress_log_interval: usize,

    /// Show an interactive progress spinner while converting
    pub show_progress: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            high_consumption_threshold: Decimal::from(DEFAULT_HIGH_CONSUMPTION_THRESHOLD),
            progress_log_interval: DEFAULT_PROGRESS_LOG_INTERVAL,
            show_progress: false,
        }
    }
}

impl ConverterConfig {
    /// Build configuration from defaults layered with environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup function
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(table_name) = lookup(env_vars::TABLE_NAME) {
            debug!("Table name overridden from environment: {}", table_name);
            self.table_name = table_name;
        }

        if let Some(threshold) = lookup(env_vars::HIGH_CONSUMPTION_THRESHOLD) {
            self.high_consumption_threshold = parse_threshold(&threshold)?;
        }

        if let Some(interval) = lookup(env_vars::PROGRESS_LOG_INTERVAL) {
            self.progress_log_interval = interval.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    env_vars::PROGRESS_LOG_INTERVAL,
                    interval
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Set the target table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Set the suspicious consumption threshold
    pub fn with_high_consumption_threshold(mut self, threshold: Decimal) -> Self {
        self.high_consumption_threshold = threshold;
        self
    }

    /// Set the number of readings between progress log lines
    pub fn with_progress_log_interval(mut self, interval: usize) -> Self {
        self.progress_log_interval = interval;
        self
    }

    /// Enable or disable the progress spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_identifier = !self.table_name.is_empty()
            && self
                .table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid_identifier {
            return Err(Error::configuration(format!(
                "Invalid table name '{}': only letters, digits, '_' and '.' are allowed",
                self.table_name
            )));
        }

        if self.high_consumption_threshold.is_sign_negative() {
            return Err(Error::configuration(format!(
                "High consumption threshold cannot be negative: {}",
                self.high_consumption_threshold
            )));
        }

        if self.progress_log_interval == 0 {
            return Err(Error::configuration(
                "Progress log interval must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Parse a threshold value supplied as text
pub fn parse_threshold(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| {
        Error::configuration(format!(
            "Invalid high consumption threshold '{}': {}",
            value, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConverterConfig::default();
        assert_eq!(config.table_name, "meter_readings");
        assert_eq!(config.high_consumption_threshold, Decimal::from(10_000));
        assert_eq!(config.progress_log_interval, 10_000);
        assert!(!config.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("NEM12_TABLE_NAME", "energy.readings"),
            ("NEM12_HIGH_CONSUMPTION_THRESHOLD", "2500.5"),
            ("NEM12_PROGRESS_LOG_INTERVAL", "50"),
        ]);

        let config = ConverterConfig::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.table_name, "energy.readings");
        assert_eq!(
            config.high_consumption_threshold,
            Decimal::from_str("2500.5").unwrap()
        );
        assert_eq!(config.progress_log_interval, 50);
    }

    #[test]
    fn test_invalid_env_threshold() {
        let result = ConverterConfig::default().with_env_overrides(|key| {
            (key == "NEM12_HIGH_CONSUMPTION_THRESHOLD").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let config = ConverterConfig::default().with_table_name("readings; DROP TABLE x");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_progress_interval() {
        let config = ConverterConfig::default().with_progress_log_interval(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config =
            ConverterConfig::default().with_high_consumption_threshold(Decimal::from(-1));
        assert!(config.validate().is_err());
    }
}
