//! Raw sensor records
//!
//! A raw record is one sample of one participant, as exported by the data
//! collection platform:
//!
//! ```json
//! {"participant": "U123", "sensor": "lamp.gps", "timestamp": 1700000000000,
//!  "latitude": 42.36, "longitude": -71.06, "accuracy": 12.0}
//! ```
//!
//! Records arrive either as NDJSON (one per line) or as a JSON array.

use crate::error::ComputeError;
use crate::sensor::SensorKind;
use crate::types::{AccelerometerSample, GpsSample};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single raw sample record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Participant identifier
    pub participant: String,
    /// Raw stream name (`lamp.accelerometer`, `lamp.gps`)
    pub sensor: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Typed sample extracted from a [`RawRecord`]
#[derive(Debug, Clone, PartialEq)]
pub enum RawSample {
    Accelerometer(AccelerometerSample),
    Gps(GpsSample),
}

/// Reasons a raw record is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("participant id is empty")]
    EmptyParticipant,

    #[error("unsupported sensor: {0}")]
    UnsupportedSensor(String),

    #[error("{sensor} record is missing field '{field}'")]
    MissingField {
        sensor: &'static str,
        field: &'static str,
    },

    #[error("field '{field}' is not a finite number")]
    NonFinite { field: &'static str },

    #[error("field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl RawRecord {
    /// Check the record without consuming it
    pub fn validate(&self) -> Result<(), RecordError> {
        self.clone().into_sample().map(|_| ())
    }

    /// Convert into a typed sample
    pub fn into_sample(self) -> Result<RawSample, RecordError> {
        if self.participant.trim().is_empty() {
            return Err(RecordError::EmptyParticipant);
        }

        match SensorKind::from_name(&self.sensor) {
            SensorKind::Accelerometer => {
                let sensor = "accelerometer";
                Ok(RawSample::Accelerometer(AccelerometerSample {
                    timestamp: self.timestamp,
                    x: required(sensor, "x", self.x)?,
                    y: required(sensor, "y", self.y)?,
                    z: required(sensor, "z", self.z)?,
                }))
            }
            SensorKind::Gps => {
                let sensor = "gps";
                let latitude = required(sensor, "latitude", self.latitude)?;
                let longitude = required(sensor, "longitude", self.longitude)?;
                if !(-90.0..=90.0).contains(&latitude) {
                    return Err(RecordError::OutOfRange {
                        field: "latitude",
                        value: latitude,
                    });
                }
                if !(-180.0..=180.0).contains(&longitude) {
                    return Err(RecordError::OutOfRange {
                        field: "longitude",
                        value: longitude,
                    });
                }
                Ok(RawSample::Gps(GpsSample {
                    timestamp: self.timestamp,
                    latitude,
                    longitude,
                    altitude: optional("altitude", self.altitude)?,
                    accuracy: optional("accuracy", self.accuracy)?,
                }))
            }
            SensorKind::Unsupported(name) => Err(RecordError::UnsupportedSensor(name)),
        }
    }
}

fn required(
    sensor: &'static str,
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, RecordError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(RecordError::NonFinite { field }),
        None => Err(RecordError::MissingField { sensor, field }),
    }
}

fn optional(field: &'static str, value: Option<f64>) -> Result<Option<f64>, RecordError> {
    match value {
        Some(v) if !v.is_finite() => Err(RecordError::NonFinite { field }),
        other => Ok(other),
    }
}

/// Parser and validator for raw record batches
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON array of records
    pub fn parse_array(json: &str) -> Result<Vec<RawRecord>, ComputeError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON, skipping blank lines
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a batch, returning only the failures
    pub fn validate_records(records: &[RawRecord]) -> Vec<RecordValidation> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| RecordValidation {
                    index,
                    participant: record.participant.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValidation {
    pub index: usize,
    pub participant: String,
    pub error: RecordError,
}
