//! Per-call computation context
//!
//! Everything a feature needs besides the request itself: where raw samples come
//! from, where diagnostics go, and the active settings.

use crate::config::CortexConfig;
use crate::diagnostics::DiagnosticSink;
use crate::source::RawDataSource;
use serde::{Deserialize, Serialize};

/// Collaborators injected into every feature computation
#[derive(Clone, Copy)]
pub struct FeatureContext<'a> {
    pub source: &'a dyn RawDataSource,
    pub diagnostics: &'a dyn DiagnosticSink,
    pub config: &'a CortexConfig,
}

impl<'a> FeatureContext<'a> {
    pub fn new(
        source: &'a dyn RawDataSource,
        diagnostics: &'a dyn DiagnosticSink,
        config: &'a CortexConfig,
    ) -> Self {
        Self {
            source,
            diagnostics,
            config,
        }
    }
}

impl std::fmt::Debug for FeatureContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Feature-specific arguments, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOptions {
    /// Raw stream to evaluate (data quality)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
    /// Bin width override in ms (data quality)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_size: Option<i64>,
    /// Lookback override in ms (Fréchet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback_ms: Option<i64>,
}

impl FeatureOptions {
    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    pub fn with_bin_size(mut self, bin_size: i64) -> Self {
        self.bin_size = Some(bin_size);
        self
    }

    pub fn with_lookback(mut self, lookback_ms: i64) -> Self {
        self.lookback_ms = Some(lookback_ms);
        self
    }
}
