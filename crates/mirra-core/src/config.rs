// Copyright 2025 The Mirra Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration for Mirra replication and sweeping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default grace period before a disowned replica may be swept (seconds).
pub const DEFAULT_GRACE_SECONDS: u64 = 10;

/// Default interval between sweep passes (seconds).
///
/// The interval is configuration handed to the external scheduler; the
/// sweeper itself runs exactly one pass per invocation.
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Configuration for the replication controller and retention sweeper.
///
/// The store identifiers have no usable defaults and must be supplied by
/// the deployment; [`Config::validate`] rejects empty values at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Destination bucket replicas are written to.
    pub dst_bucket: String,

    /// Name of the ledger table tracking replica ownership.
    pub ledger_table: String,

    /// Name of the ledger's secondary index on (state, state_changed_at).
    pub ledger_index: String,

    /// Seconds a replica must remain disowned before it may be swept.
    pub grace_seconds: u64,

    /// Seconds between sweep passes (consumed by the external scheduler).
    pub sweep_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dst_bucket: String::new(),
            ledger_table: String::new(),
            ledger_index: String::new(),
            grace_seconds: DEFAULT_GRACE_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl Config {
    /// Creates a configuration with the required store identifiers.
    pub fn new(
        dst_bucket: impl Into<String>,
        ledger_table: impl Into<String>,
        ledger_index: impl Into<String>,
    ) -> Self {
        Self {
            dst_bucket: dst_bucket.into(),
            ledger_table: ledger_table.into(),
            ledger_index: ledger_index.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::Error::Config(e.to_string()))?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed.
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Sets the grace period.
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace_seconds = grace.as_secs();
        self
    }

    /// Sets the sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_seconds = interval.as_secs();
        self
    }

    /// Returns the grace period as a Duration.
    pub fn grace_duration(&self) -> Duration {
        Duration::from_secs(self.grace_seconds)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a required store identifier is missing.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.dst_bucket.is_empty() {
            return Err(ConfigValidationError::MissingDstBucket);
        }
        if self.ledger_table.is_empty() {
            return Err(ConfigValidationError::MissingLedgerTable);
        }
        if self.ledger_index.is_empty() {
            return Err(ConfigValidationError::MissingLedgerIndex);
        }
        Ok(())
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    /// The destination bucket name is required.
    #[error("destination bucket name must be set")]
    MissingDstBucket,

    /// The ledger table name is required.
    #[error("ledger table name must be set")]
    MissingLedgerTable,

    /// The ledger index name is required.
    #[error("ledger index name must be set")]
    MissingLedgerIndex,
}

impl From<ConfigValidationError> for crate::Error {
    fn from(e: ConfigValidationError) -> Self {
        crate::Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.grace_seconds, 10);
        assert_eq!(config.sweep_interval_seconds, 60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = Config::new("replicas", "ownership", "disowned-by-time")
            .grace(Duration::from_secs(30))
            .sweep_interval(Duration::from_secs(300));

        assert_eq!(config.dst_bucket, "replicas");
        assert_eq!(config.grace_seconds, 30);
        assert_eq!(config.sweep_interval_seconds, 300);
        assert_eq!(config.grace_duration(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_reports_missing_identifiers() {
        let err = Config::new("", "t", "i").validate().unwrap_err();
        assert!(matches!(err, ConfigValidationError::MissingDstBucket));

        let err = Config::new("b", "", "i").validate().unwrap_err();
        assert!(matches!(err, ConfigValidationError::MissingLedgerTable));

        let err = Config::new("b", "t", "").validate().unwrap_err();
        assert!(matches!(err, ConfigValidationError::MissingLedgerIndex));
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            r#"
            dst_bucket = "replicas"
            ledger_table = "ownership"
            ledger_index = "disowned-by-time"
            grace_seconds = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.dst_bucket, "replicas");
        assert_eq!(config.grace_seconds, 15);
        // Omitted fields fall back to defaults.
        assert_eq!(config.sweep_interval_seconds, 60);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Config::parse("dst_bucket = [1,").is_err());
    }
}
