//! Core types for secondary feature computation
//!
//! Raw samples arrive from a [`RawDataSource`](crate::source::RawDataSource),
//! requests describe the participant and time window, and feature outputs are the
//! two-field records handed back to the caller.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day
pub const MS_IN_A_DAY: i64 = 86_400_000;

/// Anything carrying a millisecond epoch timestamp
pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

/// Raw accelerometer reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerSample {
    /// Milliseconds since epoch
    pub timestamp: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Raw GPS fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    /// Milliseconds since epoch
    pub timestamp: i64,
    /// Latitude in degrees (-90..=90)
    pub latitude: f64,
    /// Longitude in degrees (-180..=180)
    pub longitude: f64,
    /// Altitude in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Horizontal accuracy in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl Timestamped for AccelerometerSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for GpsSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for i64 {
    fn timestamp(&self) -> i64 {
        *self
    }
}

/// Participant and time window a feature is computed for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Participant identifier
    pub id: String,
    /// Window start (ms since epoch, inclusive)
    pub start: i64,
    /// Window end (ms since epoch, exclusive)
    pub end: i64,
}

impl FeatureRequest {
    pub fn new(id: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }

    /// The same participant and window length, moved back by `offset_ms`
    pub fn shifted_back(&self, offset_ms: i64) -> Self {
        Self {
            id: self.id.clone(),
            start: self.start.saturating_sub(offset_ms),
            end: self.end.saturating_sub(offset_ms),
        }
    }
}

/// Scalar feature output: `{timestamp, value}`
///
/// `timestamp` is always the window start. `value` is `None` when the feature
/// could not be computed for the requested input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureValue {
    pub timestamp: i64,
    pub value: Option<f64>,
}

/// Trajectory dissimilarity output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrechetResult {
    pub timestamp: i64,
    pub frechet_distance: Option<f64>,
}

/// Output of any registered feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureOutput {
    Value(FeatureValue),
    Frechet(FrechetResult),
}

impl FeatureOutput {
    /// Window start the output refers to
    pub fn timestamp(&self) -> i64 {
        match self {
            FeatureOutput::Value(v) => v.timestamp,
            FeatureOutput::Frechet(f) => f.timestamp,
        }
    }

    /// The scalar carried by the output, if any
    pub fn scalar(&self) -> Option<f64> {
        match self {
            FeatureOutput::Value(v) => v.value,
            FeatureOutput::Frechet(f) => f.frechet_distance,
        }
    }
}

impl From<FeatureValue> for FeatureOutput {
    fn from(value: FeatureValue) -> Self {
        FeatureOutput::Value(value)
    }
}

impl From<FrechetResult> for FeatureOutput {
    fn from(value: FrechetResult) -> Self {
        FeatureOutput::Frechet(value)
    }
}
