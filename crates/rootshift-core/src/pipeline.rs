//! End-to-end analysis: series, change points, periods, periodicity and the
//! next-change forecast in one report.

use serde::{Deserialize, Serialize};

use crate::detector::{self, ChangePoint, DetectorConfig};
use crate::draw::{self, Draw};
use crate::error::{Result, RootShiftError};
use crate::forecast::{self, ForecastResult};
use crate::periodicity::{self, PeriodicityReport};
use crate::segment::{self, SegmentConfig, StabilityPeriod};
use crate::series::{self, SeriesMap};

/// Settings for a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub segment: SegmentConfig,
    /// Overrides `detector.seed` when set.
    pub seed: Option<u64>,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.segment.validate()
    }

    /// Seed every random step of the run uses.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(self.detector.seed)
    }

    fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            seed: self.effective_seed(),
            ..self.detector.clone()
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub version: String,
    pub draw_count: usize,
    /// SHA-256 of the analysed draws.
    pub fingerprint: String,
    pub seed: u64,
    pub series: SeriesMap,
    pub change_points: Vec<ChangePoint>,
    pub periods: Vec<StabilityPeriod>,
    pub periodicity: PeriodicityReport,
    /// `None` when there were too few change points to forecast.
    pub forecast: Option<ForecastResult>,
    pub notes: Vec<String>,
}

impl AnalysisReport {
    /// The most recent stability period, if any survived segmentation.
    pub fn current_period(&self) -> Option<&StabilityPeriod> {
        self.periods.last()
    }
}

/// Run every stage over `draws`.
///
/// Configuration errors are reported before any work. A forecast that lacks
/// change points is recorded as a note rather than failing the run.
pub fn run_pipeline(draws: &[Draw], config: &PipelineConfig) -> Result<AnalysisReport> {
    config.validate()?;
    let detector_config = config.detector_config();
    log::info!(
        "analysing {} draws (method={}, seed={})",
        draws.len(),
        detector_config.method.name(),
        detector_config.seed
    );

    let series = series::generate_series(draws);
    let change_points = detector::detect_change_points(&series, &detector_config)?;
    let periods = segment::segment_periods(draws, &change_points, &config.segment)?;
    let periodicity = periodicity::analyze_periodicity(&series);

    let mut notes = Vec::new();
    if periods.is_empty() {
        notes.push(format!(
            "no interval reached the minimum period length of {}",
            config.segment.min_period_len
        ));
    }
    let forecast = match forecast::forecast_next_change(&change_points, &periodicity, draws.len()) {
        Ok(result) => Some(result),
        Err(err @ RootShiftError::InsufficientData { .. }) => {
            log::warn!("no forecast: {err}");
            notes.push(format!("forecast unavailable: {err}"));
            None
        }
        Err(err) => return Err(err),
    };

    Ok(AnalysisReport {
        version: crate::VERSION.to_string(),
        draw_count: draws.len(),
        fingerprint: draw::fingerprint(draws),
        seed: detector_config.seed,
        series,
        change_points,
        periods,
        periodicity,
        forecast,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_reports_notes() {
        let report = run_pipeline(&[], &PipelineConfig::default()).unwrap();
        assert_eq!(report.draw_count, 0);
        assert!(report.series.is_empty());
        assert!(report.change_points.is_empty());
        assert!(report.periods.is_empty());
        assert!(report.forecast.is_none());
        assert_eq!(report.notes.len(), 2);
        assert!(report.notes[1].contains("need 2, got 0"));
    }

    #[test]
    fn test_configuration_checked_first() {
        let mut config = PipelineConfig::default();
        config.segment.min_period_len = 0;
        let err = run_pipeline(&[], &config).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_seed_override() {
        let config = PipelineConfig {
            seed: Some(7),
            ..PipelineConfig::default()
        };
        assert_eq!(config.effective_seed(), 7);
        assert_eq!(PipelineConfig::default().effective_seed(), 42);
        let report = run_pipeline(&[], &config).unwrap();
        assert_eq!(report.seed, 7);
    }

    #[test]
    fn test_config_fills_defaults_from_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"detector": {"sensitivity": 2.5}, "seed": 9}"#).unwrap();
        assert_eq!(config.detector.sensitivity, 2.5);
        assert_eq!(config.detector.merge_radius, 5);
        assert_eq!(config.segment, SegmentConfig::default());
        assert_eq!(config.seed, Some(9));
    }
}
