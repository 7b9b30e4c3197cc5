//! Cortex secondary features - derived behavioral-health metrics from raw sensor streams
//!
//! Raw accelerometer and GPS samples for a participant and time window are fetched
//! through a [`RawDataSource`] and reduced to a single value:
//!
//! - **Data quality**: fraction of fixed-width bins holding at least one sample
//! - **Fréchet distance**: dissimilarity between the window's GPS trajectory and
//!   the same window one lookback period earlier
//!
//! Features are registered in a [`FeatureRegistry`] and dispatched by name.

pub mod config;
pub mod context;
pub mod coverage;
pub mod diagnostics;
pub mod encoder;
pub mod error;
pub mod features;
pub mod registry;
pub mod sensor;
pub mod source;
pub mod types;
pub mod window;

pub use config::CortexConfig;
pub use context::{FeatureContext, FeatureOptions};
pub use coverage::{coverage, coverage_of};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, MemorySink};
pub use error::ComputeError;
pub use features::{data_quality, frechet, DATA_QUALITY, FRECHET};
pub use registry::{FeatureDescriptor, FeatureRegistry};
pub use sensor::SensorKind;
pub use source::{MemorySource, RawDataSource, RawRecord, RecordAdapter};
pub use types::{FeatureOutput, FeatureRequest, FeatureValue, FrechetResult};
pub use window::Window;

/// Crate version embedded in all reports
pub const CORTEX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "cortex-secondary";
