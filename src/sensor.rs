//! Raw sensor streams a secondary feature can be computed over

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default accelerometer bin: 1 s (1 Hz)
pub const ACCELEROMETER_BIN_MS: i64 = 1000;

/// Default GPS bin: 10 min
pub const GPS_BIN_MS: i64 = 1000 * 10 * 60;

/// Raw stream selector.
///
/// Names that do not match a supported stream become `Unsupported`, which features
/// answer with a null value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gps,
    #[serde(untagged)]
    Unsupported(String),
}

impl SensorKind {
    /// Resolve a sensor name. Accepts the short name or the `lamp.` prefixed one.
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        let short = trimmed.strip_prefix("lamp.").unwrap_or(trimmed);
        match short.to_ascii_lowercase().as_str() {
            "accelerometer" => SensorKind::Accelerometer,
            "gps" => SensorKind::Gps,
            _ => SensorKind::Unsupported(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gps => "gps",
            SensorKind::Unsupported(name) => name.as_str(),
        }
    }

    /// Name of the raw feature this stream is fetched from
    pub fn raw_feature(&self) -> Option<&'static str> {
        match self {
            SensorKind::Accelerometer => Some("lamp.accelerometer"),
            SensorKind::Gps => Some("lamp.gps"),
            SensorKind::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SensorKind::Unsupported(_))
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
