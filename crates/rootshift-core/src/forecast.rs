//! Forecast of the next change point.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detector::ChangePoint;
use crate::error::{Result, RootShiftError};
use crate::periodicity::PeriodicityReport;
use crate::stats;

/// How the prediction was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    /// Last change plus the first detected periodicity lag.
    Periodicity,
    /// Last change plus the rounded mean interval.
    MeanInterval,
    /// Fallback when the first prediction is already in the past.
    MedianInterval,
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForecastMethod::Periodicity => "periodicity",
            ForecastMethod::MeanInterval => "mean-interval",
            ForecastMethod::MedianInterval => "median-interval",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub last_change_index: usize,
    pub predicted_next_index: usize,
    /// Draws until the predicted change; zero when it is already due.
    pub remaining_draws: usize,
    pub method: ForecastMethod,
    pub historical_mean_interval: f64,
    pub historical_median_interval: f64,
}

/// Predict the next change point from past intervals and periodicity.
///
/// Needs at least two change points. `sequence_len` is the number of draws
/// the change points were detected in.
pub fn forecast_next_change(
    change_points: &[ChangePoint],
    periodicity: &PeriodicityReport,
    sequence_len: usize,
) -> Result<ForecastResult> {
    if change_points.len() < 2 {
        return Err(RootShiftError::insufficient(
            "forecast",
            2,
            change_points.len(),
        ));
    }

    let intervals: Vec<f64> = change_points
        .windows(2)
        .map(|w| w[1].index as f64 - w[0].index as f64)
        .collect();
    let mean_interval = stats::mean(&intervals);
    let median_interval = stats::median(&intervals);
    let last = change_points[change_points.len() - 1].index;

    let lag = periodicity
        .values()
        .find_map(|p| p.periodicity.first().copied());

    let (mut predicted, mut method) = match lag {
        Some(lag) => (last + lag, ForecastMethod::Periodicity),
        None => (offset(last, mean_interval), ForecastMethod::MeanInterval),
    };
    if predicted <= sequence_len {
        log::debug!("forecast {predicted} ({method}) is not ahead of {sequence_len}; using median");
        predicted = offset(last, median_interval);
        method = ForecastMethod::MedianInterval;
    }

    Ok(ForecastResult {
        last_change_index: last,
        predicted_next_index: predicted,
        remaining_draws: predicted.saturating_sub(sequence_len),
        method,
        historical_mean_interval: mean_interval,
        historical_median_interval: median_interval,
    })
}

fn offset(base: usize, interval: f64) -> usize {
    base + interval.round().max(0.0) as usize
}
