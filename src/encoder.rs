//! Report encoding
//!
//! Wraps a feature output with producer and provenance metadata so results can be
//! stored or shipped without losing where they came from.

use crate::error::ComputeError;
use crate::types::{FeatureOutput, FeatureRequest};
use crate::{CORTEX_VERSION, PRODUCER_NAME};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// What was computed, for whom, over which window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub participant: String,
    pub feature: String,
    /// Window start (ms since epoch)
    pub window_start: i64,
    /// Window end (ms since epoch)
    pub window_end: i64,
    /// Window start as RFC 3339, when representable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start_utc: Option<String>,
    pub computed_at_utc: String,
}

/// A feature output with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub result: FeatureOutput,
}

/// Builds [`FeatureReport`]s stamped with one instance id
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh instance id
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(
        &self,
        feature: &str,
        request: &FeatureRequest,
        result: FeatureOutput,
    ) -> FeatureReport {
        self.encode_at(feature, request, result, Utc::now())
    }

    fn encode_at(
        &self,
        feature: &str,
        request: &FeatureRequest,
        result: FeatureOutput,
        computed_at: DateTime<Utc>,
    ) -> FeatureReport {
        FeatureReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: CORTEX_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                participant: request.id.clone(),
                feature: feature.to_string(),
                window_start: request.start,
                window_end: request.end,
                window_start_utc: Utc
                    .timestamp_millis_opt(request.start)
                    .single()
                    .map(|t| t.to_rfc3339()),
                computed_at_utc: computed_at.to_rfc3339(),
            },
            result,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        feature: &str,
        request: &FeatureRequest,
        result: FeatureOutput,
    ) -> Result<String, ComputeError> {
        let report = self.encode(feature, request, result);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}
