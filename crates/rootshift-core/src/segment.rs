//! Split the draw history at change points into stable periods.

use serde::{Deserialize, Serialize};

use crate::detector::ChangePoint;
use crate::draw::{Draw, MAX_NUMBER};
use crate::error::{Result, RootShiftError};
use crate::roots::{self, DEFAULT_ROOT_COUNT, RootSet};
use crate::stats;

/// A maximal run of draws between consecutive change points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityPeriod {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub length: usize,
    pub mean_sum: f64,
    pub mean_even_count: f64,
    pub roots: RootSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Intervals shorter than this are dropped.
    pub min_period_len: usize,
    pub roots_per_period: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_period_len: 20,
            roots_per_period: DEFAULT_ROOT_COUNT,
        }
    }
}

impl SegmentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_period_len == 0 {
            return Err(RootShiftError::config("min_period_len must be at least 1"));
        }
        if self.roots_per_period == 0 || self.roots_per_period > MAX_NUMBER as usize {
            return Err(RootShiftError::config(format!(
                "roots_per_period must be in 1..={MAX_NUMBER}, got {}",
                self.roots_per_period
            )));
        }
        Ok(())
    }
}

/// Segment `draws` at the given change points.
///
/// Change points must be strictly increasing and lie in `[1, draws.len())`.
pub fn segment_periods(
    draws: &[Draw],
    change_points: &[ChangePoint],
    config: &SegmentConfig,
) -> Result<Vec<StabilityPeriod>> {
    config.validate()?;
    let m = draws.len();

    let mut boundaries = Vec::with_capacity(change_points.len() + 2);
    boundaries.push(0);
    for cp in change_points {
        let previous = boundaries[boundaries.len() - 1];
        if cp.index == 0 || cp.index >= m {
            return Err(RootShiftError::config(format!(
                "change point {} outside [1, {m})",
                cp.index
            )));
        }
        if cp.index <= previous {
            return Err(RootShiftError::config(format!(
                "change points must be strictly increasing ({} after {previous})",
                cp.index
            )));
        }
        boundaries.push(cp.index);
    }
    boundaries.push(m);

    let mut periods = Vec::new();
    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = end - start;
        if length < config.min_period_len {
            log::debug!("dropping short interval [{start}, {end})");
            continue;
        }
        let window = &draws[start..end];
        let sums: Vec<f64> = window.iter().map(|d| f64::from(d.sum())).collect();
        let evens: Vec<f64> = window.iter().map(|d| d.even_count() as f64).collect();
        periods.push(StabilityPeriod {
            start,
            end,
            length,
            mean_sum: stats::mean(&sums),
            mean_even_count: stats::mean(&evens),
            roots: roots::extract_roots(window, config.roots_per_period)?,
        });
    }
    log::info!("segmented {m} draws into {} stability periods", periods.len());
    Ok(periods)
}
