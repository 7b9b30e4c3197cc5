//! Raw data sources
//!
//! Secondary features never read raw sensor data directly. They go through a
//! [`RawDataSource`], which returns the samples of one participant inside a
//! request window. [`MemorySource`] is the bundled implementation, filled from raw
//! records parsed by [`RecordAdapter`].

mod record;

pub use record::*;

use crate::error::ComputeError;
use crate::sensor::SensorKind;
use crate::types::{AccelerometerSample, FeatureRequest, GpsSample, Timestamped};
use std::collections::HashMap;

/// Supplier of raw sensor samples.
///
/// Implementations return samples with `request.start <= timestamp < request.end`.
/// A window without data yields an empty vector, not an error.
pub trait RawDataSource: Send + Sync {
    fn accelerometer(
        &self,
        request: &FeatureRequest,
    ) -> Result<Vec<AccelerometerSample>, ComputeError>;

    fn gps(&self, request: &FeatureRequest) -> Result<Vec<GpsSample>, ComputeError>;

    /// Timestamps of the given stream, `None` when the stream is unsupported
    fn timestamps(
        &self,
        sensor: &SensorKind,
        request: &FeatureRequest,
    ) -> Result<Option<Vec<i64>>, ComputeError> {
        match sensor {
            SensorKind::Accelerometer => Ok(Some(
                self.accelerometer(request)?
                    .iter()
                    .map(Timestamped::timestamp)
                    .collect(),
            )),
            SensorKind::Gps => Ok(Some(
                self.gps(request)?.iter().map(Timestamped::timestamp).collect(),
            )),
            SensorKind::Unsupported(_) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ParticipantSamples {
    accelerometer: Vec<AccelerometerSample>,
    gps: Vec<GpsSample>,
}

/// In-memory raw data keyed by participant
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    participants: HashMap<String, ParticipantSamples>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from raw records, rejecting the first invalid one
    pub fn from_records(records: Vec<RawRecord>) -> Result<Self, ComputeError> {
        let mut source = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            let participant = record.participant.clone();
            let sample = record.into_sample().map_err(|e| {
                ComputeError::InvalidRecord(format!("record {}: {}", index, e))
            })?;
            match sample {
                RawSample::Accelerometer(s) => source.insert_accelerometer(&participant, s),
                RawSample::Gps(s) => source.insert_gps(&participant, s),
            }
        }
        Ok(source)
    }

    pub fn insert_accelerometer(&mut self, participant: &str, sample: AccelerometerSample) {
        self.participants
            .entry(participant.to_string())
            .or_default()
            .accelerometer
            .push(sample);
    }

    pub fn insert_gps(&mut self, participant: &str, sample: GpsSample) {
        self.participants
            .entry(participant.to_string())
            .or_default()
            .gps
            .push(sample);
    }

    /// Participant ids in sorted order
    pub fn participants(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.participants.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// `(accelerometer, gps)` sample counts for a participant
    pub fn sample_counts(&self, participant: &str) -> (usize, usize) {
        self.participants
            .get(participant)
            .map(|p| (p.accelerometer.len(), p.gps.len()))
            .unwrap_or((0, 0))
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

fn in_window<T: Timestamped + Clone>(samples: &[T], request: &FeatureRequest) -> Vec<T> {
    let mut selected: Vec<T> = samples
        .iter()
        .filter(|s| s.timestamp() >= request.start && s.timestamp() < request.end)
        .cloned()
        .collect();
    selected.sort_by_key(Timestamped::timestamp);
    selected
}

impl RawDataSource for MemorySource {
    fn accelerometer(
        &self,
        request: &FeatureRequest,
    ) -> Result<Vec<AccelerometerSample>, ComputeError> {
        Ok(self
            .participants
            .get(&request.id)
            .map(|p| in_window(&p.accelerometer, request))
            .unwrap_or_default())
    }

    fn gps(&self, request: &FeatureRequest) -> Result<Vec<GpsSample>, ComputeError> {
        Ok(self
            .participants
            .get(&request.id)
            .map(|p| in_window(&p.gps, request))
            .unwrap_or_default())
    }
}
