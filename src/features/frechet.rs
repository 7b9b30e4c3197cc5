//! Trajectory dissimilarity
//!
//! Compares the GPS trajectory of the request window with the trajectory of the
//! same window one lookback period earlier (a day by default), using the discrete
//! Fréchet distance over `(latitude, longitude)` points.

use crate::context::FeatureContext;
use crate::error::ComputeError;
use crate::types::{FeatureRequest, FrechetResult, GpsSample};
use log::debug;

/// Registered feature name
pub const FRECHET: &str = "cortex.feature.frechet";

/// Fréchet distance between the current and the lookback trajectory.
///
/// `lookback_ms` of `None` uses the configured lookback. The distance is `None`
/// when either window holds no GPS fixes.
pub fn frechet(
    ctx: &FeatureContext<'_>,
    request: &FeatureRequest,
    lookback_ms: Option<i64>,
) -> Result<FrechetResult, ComputeError> {
    let lookback = lookback_ms.unwrap_or(ctx.config.frechet_lookback_ms);
    if lookback < 0 {
        return Err(ComputeError::InvalidConfig(format!(
            "lookback must not be negative, got {}",
            lookback
        )));
    }

    let current = ctx.source.gps(request)?;
    if current.is_empty() {
        ctx.diagnostics.info(
            FRECHET,
            &format!(
                "No GPS fixes for {} in [{}, {}).",
                request.id, request.start, request.end
            ),
        );
        return Ok(FrechetResult {
            timestamp: request.start,
            frechet_distance: None,
        });
    }

    let previous = ctx.source.gps(&request.shifted_back(lookback))?;
    if previous.is_empty() {
        ctx.diagnostics.info(
            FRECHET,
            &format!(
                "No GPS fixes for {} in the comparison window {}ms earlier.",
                request.id, lookback
            ),
        );
        return Ok(FrechetResult {
            timestamp: request.start,
            frechet_distance: None,
        });
    }

    debug!(
        "{}: comparing {} fixes with {} fixes {}ms earlier",
        FRECHET,
        current.len(),
        previous.len(),
        lookback
    );
    Ok(FrechetResult {
        timestamp: request.start,
        frechet_distance: discrete_frechet(&trajectory(current), &trajectory(previous)),
    })
}

/// Timestamp-ordered `(latitude, longitude)` points
fn trajectory(mut fixes: Vec<GpsSample>) -> Vec<(f64, f64)> {
    fixes.sort_by_key(|f| f.timestamp);
    fixes.iter().map(|f| (f.latitude, f.longitude)).collect()
}

fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Discrete Fréchet distance between two polylines, `None` if either is empty.
///
/// Dynamic program over the coupling table, keeping one row at a time.
pub fn discrete_frechet(p: &[(f64, f64)], q: &[(f64, f64)]) -> Option<f64> {
    if p.is_empty() || q.is_empty() {
        return None;
    }

    let mut prev = vec![0.0_f64; q.len()];
    let mut curr = vec![0.0_f64; q.len()];

    for (i, &a) in p.iter().enumerate() {
        for (j, &b) in q.iter().enumerate() {
            let d = euclidean(a, b);
            curr[j] = match (i, j) {
                (0, 0) => d,
                (0, _) => curr[j - 1].max(d),
                (_, 0) => prev[0].max(d),
                _ => prev[j].min(prev[j - 1]).min(curr[j - 1]).max(d),
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CortexConfig;
    use crate::diagnostics::MemorySink;
    use crate::source::MemorySource;
    use crate::types::MS_IN_A_DAY;

    fn fix(timestamp: i64, latitude: f64, longitude: f64) -> GpsSample {
        GpsSample {
            timestamp,
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
        }
    }

    #[test]
    fn test_identical_trajectories() {
        let path = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.5)];
        assert_eq!(discrete_frechet(&path, &path), Some(0.0));
    }

    #[test]
    fn test_single_points() {
        let d = discrete_frechet(&[(0.0, 0.0)], &[(3.0, 4.0)]).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_trajectory() {
        assert_eq!(discrete_frechet(&[], &[(1.0, 1.0)]), None);
        assert_eq!(discrete_frechet(&[(1.0, 1.0)], &[]), None);
    }

    #[test]
    fn test_parallel_lines() {
        let p = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let q = [(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)];
        let d = discrete_frechet(&p, &q).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_lengths() {
        // Every point of q must couple with p's endpoint at some stage
        let p = [(0.0, 0.0), (2.0, 0.0)];
        let q = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let d = discrete_frechet(&p, &q).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let p = [(0.0, 0.0), (0.5, 2.0), (3.0, 1.0), (4.0, 4.0)];
        let q = [(1.0, 0.0), (2.0, 2.5), (4.0, 3.0)];
        assert_eq!(discrete_frechet(&p, &q), discrete_frechet(&q, &p));
    }

    #[test]
    fn test_feature_compares_with_previous_day() {
        let mut source = MemorySource::new();
        let day = MS_IN_A_DAY;
        for (k, lat) in [42.0, 42.1, 42.2].iter().enumerate() {
            let offset = k as i64 * 3_600_000;
            source.insert_gps("U1", fix(day + offset, *lat, -71.0));
            source.insert_gps("U1", fix(offset, *lat, -71.3));
        }
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = frechet(&ctx, &FeatureRequest::new("U1", day, 2 * day), None).unwrap();

        assert_eq!(result.timestamp, day);
        assert!((result.frechet_distance.unwrap() - 0.3).abs() < 1e-9);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_feature_without_current_fixes() {
        let source = MemorySource::new();
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = frechet(&ctx, &FeatureRequest::new("U1", 0, 1000), None).unwrap();
        assert_eq!(result.frechet_distance, None);
        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].feature, FRECHET);
        assert_eq!(sink.entries()[0].level, log::Level::Info);
    }

    #[test]
    fn test_feature_without_previous_fixes() {
        let mut source = MemorySource::new();
        source.insert_gps("U1", fix(MS_IN_A_DAY + 10, 1.0, 1.0));
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = frechet(
            &ctx,
            &FeatureRequest::new("U1", MS_IN_A_DAY, 2 * MS_IN_A_DAY),
            None,
        )
        .unwrap();

        assert_eq!(result.frechet_distance, None);
        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].feature, FRECHET);
    }

    #[test]
    fn test_custom_lookback() {
        let mut source = MemorySource::new();
        source.insert_gps("U1", fix(10_000, 0.0, 0.0));
        source.insert_gps("U1", fix(4_000, 0.0, 0.5));
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = frechet(&ctx, &FeatureRequest::new("U1", 10_000, 11_000), Some(6_000))
            .unwrap();
        assert_eq!(result.frechet_distance, Some(0.5));
    }

    #[test]
    fn test_negative_lookback_rejected() {
        let source = MemorySource::new();
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = frechet(&ctx, &FeatureRequest::new("U1", 0, 1000), Some(-1));
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }
}
