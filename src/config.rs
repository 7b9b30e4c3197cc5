//! Computation settings
//!
//! Defaults reproduce the built-in behavior; a JSON file may override any field.

use crate::error::ComputeError;
use crate::sensor::{SensorKind, ACCELEROMETER_BIN_MS, GPS_BIN_MS};
use crate::types::MS_IN_A_DAY;
use serde::{Deserialize, Serialize};

/// Settings shared by all features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Data-quality bin width for accelerometer data (ms)
    pub accelerometer_bin_ms: i64,
    /// Data-quality bin width for GPS data (ms)
    pub gps_bin_ms: i64,
    /// How far back the comparison trajectory lies (ms)
    pub frechet_lookback_ms: i64,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            accelerometer_bin_ms: ACCELEROMETER_BIN_MS,
            gps_bin_ms: GPS_BIN_MS,
            frechet_lookback_ms: MS_IN_A_DAY,
        }
    }
}

impl CortexConfig {
    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: CortexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.accelerometer_bin_ms <= 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "accelerometer_bin_ms must be positive, got {}",
                self.accelerometer_bin_ms
            )));
        }
        if self.gps_bin_ms <= 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "gps_bin_ms must be positive, got {}",
                self.gps_bin_ms
            )));
        }
        if self.frechet_lookback_ms < 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "frechet_lookback_ms must not be negative, got {}",
                self.frechet_lookback_ms
            )));
        }
        Ok(())
    }

    /// Configured bin width for a stream, `None` when unsupported
    pub fn bin_width_for(&self, sensor: &SensorKind) -> Option<i64> {
        match sensor {
            SensorKind::Accelerometer => Some(self.accelerometer_bin_ms),
            SensorKind::Gps => Some(self.gps_bin_ms),
            SensorKind::Unsupported(_) => None,
        }
    }
}
