//! Data quality of raw sensor streams
//!
//! Quality is the coverage of the request window: the fraction of fixed-width bins
//! (1 s for accelerometer, 10 min for GPS unless overridden) holding at least one
//! sample.

use crate::context::FeatureContext;
use crate::coverage::coverage;
use crate::error::ComputeError;
use crate::sensor::SensorKind;
use crate::types::{FeatureRequest, FeatureValue};
use crate::window::Window;
use log::debug;

/// Registered feature name
pub const DATA_QUALITY: &str = "cortex.feature.data_quality";

/// Compute the data quality of `sensor` for the request window.
///
/// * Unsupported sensor: `value` is `None` and a notice is emitted.
/// * No samples in the window: `value` is `Some(0.0)`.
/// * `bin_size` of `None` selects the configured width for the sensor.
///
/// The window is validated before any data is fetched.
pub fn data_quality(
    ctx: &FeatureContext<'_>,
    request: &FeatureRequest,
    sensor: &str,
    bin_size: Option<i64>,
) -> Result<FeatureValue, ComputeError> {
    let kind = SensorKind::from_name(sensor);

    let bin_width = match (bin_size, ctx.config.bin_width_for(&kind)) {
        (_, None) => {
            ctx.diagnostics.info(
                DATA_QUALITY,
                &format!("Sensor '{}' is not yet supported.", kind),
            );
            return Ok(FeatureValue {
                timestamp: request.start,
                value: None,
            });
        }
        (Some(width), Some(_)) => width,
        (None, Some(default)) => default,
    };

    let window = Window::new(request.start, request.end, bin_width)?;

    let timestamps = match ctx.source.timestamps(&kind, request)? {
        Some(timestamps) => timestamps,
        None => Vec::new(),
    };

    if timestamps.is_empty() {
        debug!("{}: no {} samples for {}", DATA_QUALITY, kind, request.id);
        return Ok(FeatureValue {
            timestamp: request.start,
            value: Some(0.0),
        });
    }

    Ok(FeatureValue {
        timestamp: request.start,
        value: Some(coverage(&timestamps, &window)),
    })
}
