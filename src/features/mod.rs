//! Secondary features
//!
//! Each feature fetches raw samples through the [`FeatureContext`](crate::context::FeatureContext)
//! and reduces them to one scalar for the request window:
//! - data quality: share of time bins with at least one sample
//! - Fréchet distance: dissimilarity between today's and an earlier GPS trajectory

pub mod data_quality;
pub mod frechet;

pub use data_quality::{data_quality, DATA_QUALITY};
pub use frechet::{discrete_frechet, frechet, FRECHET};
