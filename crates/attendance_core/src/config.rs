//! Store configuration.
//!
//! # Invariants
//! - `thresholds.good < thresholds.excellent <= 100`.
//! - Semester length and week count are non-zero.
//! - The storage key is non-empty.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "attendance_data";
pub const DEFAULT_SEMESTER_TOTAL_WEEKS: u32 = 20;
pub const DEFAULT_SEMESTER_LENGTH_MONTHS: u32 = 4;
pub const DEFAULT_GOOD_THRESHOLD: u32 = 80;
pub const DEFAULT_EXCELLENT_THRESHOLD: u32 = 90;

/// Percentage cut-offs for `excellent`/`good`/`warning` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassificationThresholds {
    /// Lowest percentage classified as `good`.
    pub good: u32,
    /// Lowest percentage classified as `excellent`.
    pub excellent: u32,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            good: DEFAULT_GOOD_THRESHOLD,
            excellent: DEFAULT_EXCELLENT_THRESHOLD,
        }
    }
}

/// Configuration for one `AttendanceStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub storage_key: String,
    pub semester_total_weeks: u32,
    pub semester_length_months: u32,
    pub thresholds: ClassificationThresholds,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            semester_total_weeks: DEFAULT_SEMESTER_TOTAL_WEEKS,
            semester_length_months: DEFAULT_SEMESTER_LENGTH_MONTHS,
            thresholds: ClassificationThresholds::default(),
        }
    }
}

impl StoreConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storageKey must not be empty"));
        }
        if self.semester_total_weeks == 0 {
            return Err(ConfigError::Invalid("semesterTotalWeeks must be > 0"));
        }
        if self.semester_length_months == 0 {
            return Err(ConfigError::Invalid("semesterLengthMonths must be > 0"));
        }
        let ClassificationThresholds { good, excellent } = self.thresholds;
        if good >= excellent || excellent > 100 {
            return Err(ConfigError::Invalid(
                "thresholds must satisfy good < excellent <= 100",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid store config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_STORAGE_KEY};

    #[test]
    fn missing_fields_take_defaults() {
        let config = StoreConfig::from_json_str(r#"{"semesterTotalWeeks": 16}"#).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.semester_total_weeks, 16);
        assert_eq!(config.semester_length_months, 4);
        assert_eq!(config.thresholds.good, 80);
        assert_eq!(config.thresholds.excellent, 90);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = StoreConfig::from_json_str(r#"{"thresholds": {"good": 95, "excellent": 90}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = StoreConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
