//! Small numeric helpers shared by the engine stages.

use statrs::statistics::{Data, Median, Statistics};

use crate::error::{Result, RootShiftError};

/// Standard deviations below this are treated as zero variance.
const VARIANCE_FLOOR: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::mean(values.iter())
}

/// Population standard deviation (divides by n).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::population_std_dev(values.iter())
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

/// First difference: `out[i] = values[i + 1] - values[i]`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Z-normalize with the population standard deviation.
///
/// Fails with `NumericDegeneracy` when the values have zero variance; the
/// caller decides what to skip.
pub fn z_normalize(values: &[f64], context: &str) -> Result<Vec<f64>> {
    let sd = std_dev(values);
    if values.is_empty() || !sd.is_finite() || sd < VARIANCE_FLOOR {
        return Err(RootShiftError::degenerate(context));
    }
    let m = mean(values);
    Ok(values.iter().map(|&v| (v - m) / sd).collect())
}

/// Indices of strict local maxima whose value is at least `height`.
///
/// The first and last points are never peaks.
pub fn find_peaks(values: &[f64], height: f64) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }
    (1..values.len() - 1)
        .filter(|&i| {
            values[i] > values[i - 1] && values[i] > values[i + 1] && values[i] >= height
        })
        .collect()
}

/// Slope of the least-squares line through `(i, values[i])`.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(values);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(values) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean) * (x - x_mean);
    }
    Some(sxy / sxx)
}
