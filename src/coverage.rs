//! Coverage estimation
//!
//! Coverage is the fraction of a window's bins that hold at least one sample.
//! The denominator is the unrounded `(end - start) / bin_width`, while a trailing
//! partial bin is still matched over its full width. A hit in that bin can
//! therefore push the ratio above 1.

use crate::error::ComputeError;
use crate::types::Timestamped;
use crate::window::Window;
use log::debug;
use std::collections::HashSet;

/// Fraction of `window` bins containing at least one of `samples`.
///
/// Runs in a single pass over the samples; ordering and duplicates do not matter.
pub fn coverage<T: Timestamped>(samples: &[T], window: &Window) -> f64 {
    let hit_bins: HashSet<i128> = samples
        .iter()
        .filter_map(|s| window.bin_index(s.timestamp()))
        .collect();

    let total_bins = window.total_bins();
    debug!(
        "coverage: {} of {} bins hit ({} samples, bin_width={}ms)",
        hit_bins.len(),
        total_bins,
        samples.len(),
        window.bin_width()
    );

    hit_bins.len() as f64 / total_bins
}

/// Validate the window bounds, then compute [`coverage`] over raw timestamps
pub fn coverage_of(
    timestamps: &[i64],
    start: i64,
    end: i64,
    bin_width: i64,
) -> Result<f64, ComputeError> {
    let window = Window::new(start, end, bin_width)?;
    Ok(coverage(timestamps, &window))
}
