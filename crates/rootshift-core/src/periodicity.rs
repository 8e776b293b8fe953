//! Periodicity and trend analysis of the derived series.
//!
//! For every series: an autocorrelation curve, the lags where that curve
//! peaks (candidate cycle lengths) and, for long enough histories, the slope
//! of segment means as a coarse trend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::{SeriesKind, SeriesMap};
use crate::stats;

/// Upper bound (exclusive) on autocorrelation lags.
pub const MAX_LAG: usize = 50;

/// Minimum z-scored correlation for a periodicity peak.
pub const PEAK_HEIGHT: f64 = 0.2;

const MAX_TREND_SEGMENTS: usize = 5;
const DRAWS_PER_TREND_SEGMENT: usize = 50;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Autocorrelation at a single lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

/// Periodicity summary of one series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesPeriodicity {
    /// Lags with defined correlation, ascending.
    pub autocorrelation: Vec<LagCorrelation>,
    /// Lags at which the curve peaks, in the order found.
    pub periodicity: Vec<usize>,
    /// Slope of segment means over segment index.
    pub trend: Option<f64>,
}

/// Per-series periodicity, iterated in declared series order.
pub type PeriodicityReport = BTreeMap<SeriesKind, SeriesPeriodicity>;

// ---------------------------------------------------------------------------
// Analysis functions
// ---------------------------------------------------------------------------

/// Analyze every series.
pub fn analyze_periodicity(series: &SeriesMap) -> PeriodicityReport {
    series
        .iter()
        .map(|(&kind, values)| {
            let autocorrelation = autocorrelation(values, MAX_LAG);
            let periodicity = periodicity_lags(&autocorrelation);
            if !periodicity.is_empty() {
                log::debug!("{kind}: periodicity at lags {periodicity:?}");
            }
            let analysis = SeriesPeriodicity {
                periodicity,
                trend: trend_slope(values),
                autocorrelation,
            };
            (kind, analysis)
        })
        .collect()
}

/// Correlation of the series with itself shifted by each lag in
/// `1..min(max_lag, len / 2)`.
///
/// Both slices are z-normalized on their own; a lag where either slice has
/// zero variance is left out of the curve.
pub fn autocorrelation(values: &[f64], max_lag: usize) -> Vec<LagCorrelation> {
    let n = values.len();
    let upper = max_lag.min(n / 2);
    let mut curve = Vec::new();
    for lag in 1..upper {
        let head = stats::z_normalize(&values[..n - lag], "autocorrelation head");
        let tail = stats::z_normalize(&values[lag..], "autocorrelation tail");
        let (head, tail) = match (head, tail) {
            (Ok(h), Ok(t)) => (h, t),
            _ => continue,
        };
        let products: Vec<f64> = head.iter().zip(&tail).map(|(a, b)| a * b).collect();
        curve.push(LagCorrelation {
            lag,
            correlation: stats::mean(&products),
        });
    }
    curve
}

/// Lags at which the z-scored autocorrelation curve has a strict local
/// maximum of at least [`PEAK_HEIGHT`].
pub fn periodicity_lags(curve: &[LagCorrelation]) -> Vec<usize> {
    let correlations: Vec<f64> = curve.iter().map(|c| c.correlation).collect();
    match stats::z_normalize(&correlations, "autocorrelation curve") {
        Ok(z) => stats::find_peaks(&z, PEAK_HEIGHT)
            .into_iter()
            .map(|i| curve[i].lag)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Slope of segment means over segment index.
///
/// Uses `min(5, len / 50)` equal segments, the last absorbing any remainder;
/// fewer than two segments gives `None`.
pub fn trend_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    let count = MAX_TREND_SEGMENTS.min(n / DRAWS_PER_TREND_SEGMENT);
    if count < 2 {
        return None;
    }
    let seg_len = n / count;
    let means: Vec<f64> = (0..count)
        .map(|i| {
            let start = i * seg_len;
            let end = if i + 1 == count { n } else { start + seg_len };
            stats::mean(&values[start..end])
        })
        .collect();
    stats::linear_slope(&means)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oscillation(period: usize, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect()
    }

    fn noise_seeded(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64
            })
            .collect()
    }

    #[test]
    fn test_lag_range_is_exclusive() {
        let curve = autocorrelation(&noise_seeded(200, 7), MAX_LAG);
        assert_eq!(curve.len(), 49);
        assert_eq!(curve[0].lag, 1);
        assert_eq!(curve[48].lag, 49);

        let short = autocorrelation(&noise_seeded(30, 7), MAX_LAG);
        assert_eq!(short.iter().map(|c| c.lag).collect::<Vec<_>>(), (1..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_period_ten_oscillation() {
        let mut series = SeriesMap::new();
        series.insert(SeriesKind::Sum, oscillation(10, 200));
        let report = analyze_periodicity(&series);
        let sum = &report[&SeriesKind::Sum];
        assert_eq!(sum.periodicity.first(), Some(&10));
        assert!(sum.periodicity.iter().all(|lag| lag % 10 == 0));
        assert!((sum.autocorrelation[9].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_has_no_curve() {
        let mut series = SeriesMap::new();
        series.insert(SeriesKind::EvenCount, vec![3.0; 120]);
        let report = analyze_periodicity(&series);
        let even = &report[&SeriesKind::EvenCount];
        assert!(even.autocorrelation.is_empty());
        assert!(even.periodicity.is_empty());
        assert_eq!(even.trend, Some(0.0));
    }

    #[test]
    fn test_trend_needs_two_segments() {
        assert_eq!(trend_slope(&vec![1.0; 99]), None);
        // 130 draws -> 2 segments of 65.
        let ramp: Vec<f64> = (0..130).map(|i| i as f64).collect();
        let slope = trend_slope(&ramp).unwrap();
        assert!((slope - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_last_segment_absorbs_remainder() {
        // 110 draws -> 2 segments: [0, 55) and [55, 110).
        let mut values = vec![0.0; 55];
        values.extend(vec![10.0; 55]);
        assert!((trend_slope(&values).unwrap() - 10.0).abs() < 1e-12);

        // 101 draws -> segments [0, 50) and [50, 101).
        let mut values = vec![0.0; 50];
        values.extend(vec![4.0; 51]);
        assert!((trend_slope(&values).unwrap() - 4.0).abs() < 1e-12);
    }
}
