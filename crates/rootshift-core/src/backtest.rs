//! Walk-forward evaluation of suggestions against held-out draws.
//!
//! At each step the pipeline only sees the draws before the step index; the
//! suggestions it produces are scored by how many numbers they share with
//! the draw at that index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::draw::Draw;
use crate::error::{Result, RootShiftError};
use crate::pipeline::{self, PipelineConfig};
use crate::suggest::{self, Strategy, SuggestionConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub step: usize,
    /// Suggestions scored per step.
    pub suggestions: usize,
    pub pipeline: PipelineConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 100,
            step: 10,
            suggestions: 3,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(RootShiftError::config("step must be at least 1"));
        }
        if self.start > self.end {
            return Err(RootShiftError::config(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        self.suggestion_config().validate()?;
        self.pipeline.validate()
    }

    fn suggestion_config(&self) -> SuggestionConfig {
        SuggestionConfig {
            max_suggestions: self.suggestions,
            ..SuggestionConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSuggestion {
    pub strategy: Strategy,
    pub numbers: Vec<u8>,
    /// Numbers shared with the target draw.
    pub hits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestStep {
    /// Index of the target draw; the pipeline saw `draws[..index]`.
    pub index: usize,
    pub target: Draw,
    pub suggestions: Vec<ScoredSuggestion>,
    /// Set when the pipeline failed at this step.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub steps: Vec<BacktestStep>,
    /// Mean hits per strategy over the steps that produced it.
    pub mean_hits: BTreeMap<Strategy, f64>,
}

/// Run the walk-forward evaluation.
pub fn backtest(draws: &[Draw], config: &BacktestConfig) -> Result<BacktestReport> {
    config.validate()?;
    let suggestion_config = config.suggestion_config();

    let mut steps = Vec::new();
    for index in (config.start..config.end).step_by(config.step) {
        if index + 1 >= draws.len() {
            break;
        }
        let history = &draws[..index];
        let target = draws[index];

        let outcome = pipeline::run_pipeline(history, &config.pipeline)
            .and_then(|report| suggest::suggest(history, &report, &suggestion_config));
        let step = match outcome {
            Ok(suggestions) => BacktestStep {
                index,
                target,
                suggestions: suggestions
                    .into_iter()
                    .map(|s| ScoredSuggestion {
                        hits: s.numbers.iter().filter(|&&v| target.contains(v)).count(),
                        strategy: s.strategy,
                        numbers: s.numbers,
                    })
                    .collect(),
                error: None,
            },
            Err(err) => {
                log::warn!("backtest step {index} failed: {err}");
                BacktestStep {
                    index,
                    target,
                    suggestions: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        steps.push(step);
    }

    let mut totals: BTreeMap<Strategy, (usize, usize)> = BTreeMap::new();
    for scored in steps.iter().flat_map(|s| &s.suggestions) {
        let entry = totals.entry(scored.strategy).or_default();
        entry.0 += scored.hits;
        entry.1 += 1;
    }
    let mean_hits = totals
        .into_iter()
        .map(|(strategy, (hits, count))| (strategy, hits as f64 / count as f64))
        .collect();

    log::info!("backtest evaluated {} steps", steps.len());
    Ok(BacktestReport { steps, mean_hits })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeated(values: [u8; 6], count: usize) -> Vec<Draw> {
        vec![Draw::new(&values).unwrap(); count]
    }

    #[test]
    fn test_steps_stop_before_last_draw() {
        let draws = repeated([3, 13, 23, 33, 43, 53], 45);
        let report = backtest(&draws, &BacktestConfig::default()).unwrap();
        let indices: Vec<usize> = report.steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 10, 20, 30, 40]);
        assert!(report.steps.iter().all(|s| s.error.is_none()));
    }

    #[test]
    fn test_constant_history_scores_current_roots() {
        let draws = repeated([3, 13, 23, 33, 43, 53], 45);
        let report = backtest(&draws, &BacktestConfig::default()).unwrap();

        // Fewer than 20 draws of history leave no period to suggest from.
        assert!(report.steps[0].suggestions.is_empty());
        assert!(report.steps[1].suggestions.is_empty());

        let step = &report.steps[2];
        assert_eq!(step.suggestions.len(), 2);
        let current = &step.suggestions[0];
        assert_eq!(current.strategy, Strategy::CurrentRoots);
        // Roots 3, 13, 23 are all in the target.
        assert!(current.hits >= 3);
        assert!(report.mean_hits[&Strategy::CurrentRoots] >= 3.0);
        assert!(report.mean_hits.contains_key(&Strategy::PeriodParity));
    }

    #[test]
    fn test_rejects_zero_step() {
        let config = BacktestConfig {
            step: 0,
            ..BacktestConfig::default()
        };
        assert_eq!(backtest(&[], &config).unwrap_err().kind(), "configuration");
    }
}
