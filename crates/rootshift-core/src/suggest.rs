//! Number suggestions derived from an analysis report.
//!
//! Each strategy reads a different part of the report: the current period's
//! roots, how roots moved between periods, the forecast, the current parity
//! balance and the cycle found in the `sum` series. Strategies that have
//! nothing to work with are skipped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draw::{DRAW_SIZE, Draw, MAX_NUMBER};
use crate::error::{Result, RootShiftError};
use crate::pipeline::AnalysisReport;
use crate::roots::RootSet;
use crate::series::SeriesKind;

/// Roots combined by the transition strategy.
const TRANSITION_ROOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CurrentRoots,
    RootTrend,
    Transition,
    PeriodParity,
    CyclicPattern,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::CurrentRoots => "current_roots",
            Strategy::RootTrend => "root_trend",
            Strategy::Transition => "transition",
            Strategy::PeriodParity => "period_parity",
            Strategy::CyclicPattern => "cyclic_pattern",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub strategy: Strategy,
    /// Six distinct values, ascending.
    pub numbers: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max_suggestions: usize,
    /// Forecasts with fewer remaining draws trigger the transition strategy.
    pub transition_window: usize,
    /// Draws the parity strategy counts frequencies over.
    pub recent_draws: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            transition_window: 10,
            recent_draws: 20,
        }
    }
}

impl SuggestionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 {
            return Err(RootShiftError::config("max_suggestions must be at least 1"));
        }
        if self.recent_draws == 0 {
            return Err(RootShiftError::config("recent_draws must be at least 1"));
        }
        Ok(())
    }
}

/// Build suggestions for the draw after `draws`.
///
/// `report` must come from a pipeline run over the same `draws`. A report
/// without stability periods yields no suggestions.
pub fn suggest(
    draws: &[Draw],
    report: &AnalysisReport,
    config: &SuggestionConfig,
) -> Result<Vec<Suggestion>> {
    config.validate()?;
    if report.draw_count != draws.len() {
        return Err(RootShiftError::config(format!(
            "report covers {} draws but {} were supplied",
            report.draw_count,
            draws.len()
        )));
    }
    let Some(current) = report.current_period() else {
        log::info!("no stability periods; nothing to suggest");
        return Ok(Vec::new());
    };

    let mut suggestions = vec![Suggestion {
        strategy: Strategy::CurrentRoots,
        numbers: expand_roots(current.roots.values()),
    }];

    if report.periods.len() >= 2 {
        let previous = &report.periods[report.periods.len() - 2];
        suggestions.push(Suggestion {
            strategy: Strategy::RootTrend,
            numbers: expand_roots(&project_roots(&previous.roots, &current.roots)),
        });
    }

    let change_is_near = report
        .forecast
        .as_ref()
        .is_some_and(|f| f.remaining_draws < config.transition_window);
    if change_is_near {
        suggestions.push(Suggestion {
            strategy: Strategy::Transition,
            numbers: expand_roots(&common_roots(report)),
        });
    }

    let recent_start = draws.len().saturating_sub(config.recent_draws);
    suggestions.push(Suggestion {
        strategy: Strategy::PeriodParity,
        numbers: parity_pick(&draws[recent_start..], current.mean_even_count),
    });

    let sum_cycle = report
        .periodicity
        .get(&SeriesKind::Sum)
        .and_then(|p| p.periodicity.first().copied());
    if let Some(period) = sum_cycle.filter(|&p| p > 0) {
        let phase = draws.len() % period;
        let in_phase: Vec<Draw> = draws
            .iter()
            .enumerate()
            .filter(|(i, _)| i % period == phase)
            .map(|(_, d)| *d)
            .collect();
        if !in_phase.is_empty() {
            suggestions.push(Suggestion {
                strategy: Strategy::CyclicPattern,
                numbers: most_frequent(&in_phase, DRAW_SIZE, |_| true),
            });
        }
    }

    suggestions.truncate(config.max_suggestions);
    log::info!("built {} suggestions", suggestions.len());
    Ok(suggestions)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Grow a root list to six numbers with fixed per-root transforms, then the
/// smallest unused values. More than six roots keeps the first six.
pub fn expand_roots(roots: &[u8]) -> Vec<u8> {
    let mut numbers: Vec<u8> = Vec::with_capacity(DRAW_SIZE);
    for &root in roots {
        push_unique(&mut numbers, root);
    }
    for &root in roots {
        let r = u32::from(root);
        for candidate in [(r * 7) % 60 + 1, (r * 13 + 7) % 60 + 1, (r * 17 + 13) % 60 + 1] {
            push_unique(&mut numbers, candidate as u8);
        }
    }
    for v in 1..=MAX_NUMBER {
        push_unique(&mut numbers, v);
    }

    numbers.sort_unstable();
    numbers
}

fn push_unique(numbers: &mut Vec<u8>, value: u8) {
    if numbers.len() < DRAW_SIZE && !numbers.contains(&value) {
        numbers.push(value);
    }
}

/// Continue each root's movement from the previous period into the next.
fn project_roots(previous: &RootSet, current: &RootSet) -> Vec<u8> {
    current
        .values()
        .iter()
        .enumerate()
        .map(|(i, &now)| match previous.values().get(i) {
            Some(&before) => {
                let projected = 2 * i32::from(now) - i32::from(before);
                projected.clamp(1, i32::from(MAX_NUMBER)) as u8
            }
            None => now,
        })
        .collect()
}

/// Roots named most often across all periods, ascending value on ties.
fn common_roots(report: &AnalysisReport) -> Vec<u8> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for period in &report.periods {
        for &root in period.roots.values() {
            *counts.entry(root).or_default() += 1;
        }
    }
    let mut ranked: Vec<(u8, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(TRANSITION_ROOTS).map(|(v, _)| v).collect()
}

/// Most frequent evens and odds in the proportion of the period's mean even
/// count.
fn parity_pick(recent: &[Draw], mean_even_count: f64) -> Vec<u8> {
    let evens = (mean_even_count.round().max(0.0) as usize).min(DRAW_SIZE);
    let mut numbers = most_frequent(recent, evens, |v| v % 2 == 0);
    numbers.extend(most_frequent(recent, DRAW_SIZE - evens, |v| v % 2 == 1));
    numbers.sort_unstable();
    numbers
}

/// Top `count` values accepted by `keep`, by frequency in `draws` then
/// ascending value. Unseen values rank last.
fn most_frequent(draws: &[Draw], count: usize, keep: impl Fn(u8) -> bool) -> Vec<u8> {
    let mut counts = [0usize; MAX_NUMBER as usize + 1];
    for draw in draws {
        for &v in draw.values() {
            counts[v as usize] += 1;
        }
    }
    let mut candidates: Vec<u8> = (1..=MAX_NUMBER).filter(|&v| keep(v)).collect();
    candidates.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]).then(a.cmp(&b)));
    candidates.truncate(count);
    candidates.sort_unstable();
    candidates
}
