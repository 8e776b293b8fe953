//! Root sets over sliding windows and the shifts between them.

use serde::{Deserialize, Serialize};

use crate::draw::{Draw, MAX_NUMBER};
use crate::error::{Result, RootShiftError};
use crate::roots::{self, DEFAULT_ROOT_COUNT, RootSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub window_len: usize,
    /// Fraction of each window shared with the next, in `[0, 1)`.
    pub overlap: f64,
    pub roots: usize,
    /// Minimum root difference reported as a shift.
    pub shift_threshold: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_len: 50,
            overlap: 0.5,
            roots: DEFAULT_ROOT_COUNT,
            shift_threshold: 0.5,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_len == 0 {
            return Err(RootShiftError::config("window_len must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(RootShiftError::config(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if self.roots == 0 || self.roots > MAX_NUMBER as usize {
            return Err(RootShiftError::config(format!(
                "roots must be in 1..={MAX_NUMBER}, got {}",
                self.roots
            )));
        }
        if !(0.0..=1.0).contains(&self.shift_threshold) {
            return Err(RootShiftError::config(format!(
                "shift_threshold must be in [0, 1], got {}",
                self.shift_threshold
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn step(&self) -> usize {
        ((self.window_len as f64 * (1.0 - self.overlap)).floor() as usize).max(1)
    }
}

/// Roots of the draws in `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootWindow {
    pub start: usize,
    pub end: usize,
    pub roots: RootSet,
}

/// A window whose roots differ enough from the previous window's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootShift {
    /// Start of the later window.
    pub index: usize,
    pub previous: RootSet,
    pub current: RootSet,
    /// `1 - |previous ∩ current| / |current|`.
    pub difference: f64,
}

/// Extract roots for every full window.
pub fn root_windows(draws: &[Draw], config: &WindowConfig) -> Result<Vec<RootWindow>> {
    config.validate()?;
    let step = config.step();
    let mut windows = Vec::new();
    let mut start = 0;
    while start + config.window_len <= draws.len() {
        let end = start + config.window_len;
        windows.push(RootWindow {
            start,
            end,
            roots: roots::extract_roots(&draws[start..end], config.roots)?,
        });
        start += step;
    }
    log::info!(
        "extracted roots for {} windows of {} draws (step {step})",
        windows.len(),
        config.window_len
    );
    Ok(windows)
}

/// Consecutive window pairs whose root difference reaches `threshold`.
pub fn root_shifts(windows: &[RootWindow], threshold: f64) -> Vec<RootShift> {
    windows
        .windows(2)
        .filter_map(|pair| {
            let (previous, current) = (&pair[0].roots, &pair[1].roots);
            if current.is_empty() {
                return None;
            }
            let difference = 1.0 - previous.overlap(current) as f64 / current.len() as f64;
            (difference >= threshold).then(|| RootShift {
                index: pair[1].start,
                previous: previous.clone(),
                current: current.clone(),
                difference,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeated(values: [u8; 6], count: usize) -> Vec<Draw> {
        vec![Draw::new(&values).unwrap(); count]
    }

    #[test]
    fn test_step_from_overlap() {
        let config = WindowConfig::default();
        assert_eq!(config.step(), 25);
        let dense = WindowConfig {
            window_len: 3,
            overlap: 0.9,
            ..WindowConfig::default()
        };
        assert_eq!(dense.step(), 1);
    }

    #[test]
    fn test_windows_cover_full_spans_only() {
        let draws = repeated([1, 2, 3, 4, 5, 6], 120);
        let windows = root_windows(&draws, &WindowConfig::default()).unwrap();
        let spans: Vec<(usize, usize)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(spans, vec![(0, 50), (25, 75), (50, 100)]);
    }

    #[test]
    fn test_shift_between_regimes() {
        let mut draws = repeated([1, 2, 3, 4, 5, 6], 50);
        draws.extend(repeated([31, 32, 33, 34, 35, 36], 50));
        let config = WindowConfig {
            overlap: 0.0,
            ..WindowConfig::default()
        };
        let windows = root_windows(&draws, &config).unwrap();
        assert_eq!(windows.len(), 2);
        let shifts = root_shifts(&windows, config.shift_threshold);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].index, 50);
        assert_eq!(shifts[0].previous.values(), &[1, 2, 3]);
        assert_eq!(shifts[0].current.values(), &[31, 32, 33]);
        assert_eq!(shifts[0].difference, 1.0);
    }

    #[test]
    fn test_stable_roots_emit_no_shift() {
        let draws = repeated([7, 14, 21, 28, 35, 42], 100);
        let windows = root_windows(&draws, &WindowConfig::default()).unwrap();
        assert!(root_shifts(&windows, 0.5).is_empty());
    }

    #[test]
    fn test_rejects_bad_overlap() {
        let config = WindowConfig {
            overlap: 1.0,
            ..WindowConfig::default()
        };
        assert_eq!(root_windows(&[], &config).unwrap_err().kind(), "configuration");
    }
}
