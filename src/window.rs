//! Time windows split into fixed-width bins

use crate::error::ComputeError;
use serde::Serialize;

/// A validated `[start, end)` window divided into `bin_width` sized bins.
///
/// Bins start at `start + k * bin_width` for every such value below `end`. The last
/// bin keeps its full width even when `bin_width` does not divide the window, so it
/// may reach past `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    start: i64,
    end: i64,
    bin_width: i64,
}

impl Window {
    /// Build a window, rejecting `end <= start` and `bin_width <= 0`
    pub fn new(start: i64, end: i64, bin_width: i64) -> Result<Self, ComputeError> {
        if end <= start || bin_width <= 0 {
            return Err(ComputeError::InvalidWindow {
                start,
                end,
                bin_width,
            });
        }
        Ok(Self {
            start,
            end,
            bin_width,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn bin_width(&self) -> i64 {
        self.bin_width
    }

    /// Window length divided by bin width, unrounded
    pub fn total_bins(&self) -> f64 {
        self.span() as f64 / self.bin_width as f64
    }

    /// Number of bins actually iterated (the trailing partial bin included)
    ///
    /// Kept in `i128`: a full-range window with unit bins has more than `i64::MAX` of them.
    pub fn bin_count(&self) -> i128 {
        let width = i128::from(self.bin_width);
        (self.span() + width - 1) / width
    }

    /// Start of every bin, in order
    pub fn bin_starts(&self) -> impl Iterator<Item = i64> + '_ {
        // every bin start lies below `end`, so it fits back into i64
        (0..self.bin_count())
            .map(move |k| (i128::from(self.start) + k * i128::from(self.bin_width)) as i64)
    }

    /// Index of the bin holding `timestamp`, if any
    pub fn bin_index(&self, timestamp: i64) -> Option<i128> {
        if timestamp < self.start {
            return None;
        }
        let offset = i128::from(timestamp) - i128::from(self.start);
        let index = offset / i128::from(self.bin_width);
        if index < self.bin_count() {
            Some(index)
        } else {
            None
        }
    }

    fn span(&self) -> i128 {
        i128::from(self.end) - i128::from(self.start)
    }
}
