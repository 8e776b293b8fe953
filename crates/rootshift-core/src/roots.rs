//! Root-number extraction.
//!
//! Three independent rankings vote on which values characterize a window of
//! draws: raw frequency, stability of the gap to the preceding sorted member,
//! and how little the draws containing a value deviate from the window's mean
//! sum. Candidates named by more rankings win; every tie breaks toward the
//! smaller value so the result never depends on container iteration order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::draw::{Draw, MAX_NUMBER};
use crate::error::{Result, RootShiftError};

/// Length of each ranking list.
pub const CANDIDATES_PER_RANKING: usize = 10;

/// Expected spacing between sorted members of a uniform 6-of-60 draw.
pub const IDEAL_GAP: f64 = 8.0;

/// Default number of roots per window.
pub const DEFAULT_ROOT_COUNT: usize = 3;

const SLOTS: usize = MAX_NUMBER as usize + 1;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Distinct root values in `1..=MAX_NUMBER`, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootSet(Vec<u8>);

impl RootSet {
    /// Sorts and deduplicates `values`.
    pub fn from_values(mut values: Vec<u8>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self(values)
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: u8) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Number of values shared with `other`.
    pub fn overlap(&self, other: &RootSet) -> usize {
        self.0.iter().filter(|&&v| other.contains(v)).count()
    }
}

/// The three candidate rankings for a window, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRankings {
    pub frequency: Vec<u8>,
    pub gap_stability: Vec<u8>,
    pub sum_contribution: Vec<u8>,
}

impl RootRankings {
    /// How many rankings name `value` (0–3).
    pub fn votes(&self, value: u8) -> usize {
        [&self.frequency, &self.gap_stability, &self.sum_contribution]
            .iter()
            .filter(|list| list.contains(&value))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Compute the three rankings over the values observed in `window`.
pub fn rank_candidates(window: &[Draw]) -> RootRankings {
    let mut counts = [0usize; SLOTS];
    let mut gap_sums = [0.0f64; SLOTS];
    let mut gap_hits = [0usize; SLOTS];
    let mut contributions = [0.0f64; SLOTS];

    for draw in window {
        let values = draw.values();
        for (pos, &v) in values.iter().enumerate() {
            counts[v as usize] += 1;
            if pos > 0 {
                gap_sums[v as usize] += f64::from(v - values[pos - 1]);
                gap_hits[v as usize] += 1;
            }
        }
    }

    let mean_sum = if window.is_empty() {
        0.0
    } else {
        window.iter().map(|d| f64::from(d.sum())).sum::<f64>() / window.len() as f64
    };
    for draw in window {
        let deviation = (f64::from(draw.sum()) - mean_sum).abs();
        for &v in draw.values() {
            contributions[v as usize] += deviation;
        }
    }

    let observed: Vec<u8> = (1..=MAX_NUMBER).filter(|&v| counts[v as usize] > 0).collect();

    let mut frequency = observed.clone();
    frequency.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]).then(a.cmp(&b)));
    frequency.truncate(CANDIDATES_PER_RANKING);

    let gap_distance = |v: u8| {
        let hits = gap_hits[v as usize];
        let average = if hits > 0 {
            gap_sums[v as usize] / hits as f64
        } else {
            0.0
        };
        (average - IDEAL_GAP).abs()
    };
    let mut gap_stability = observed.clone();
    gap_stability.sort_by(|&a, &b| ascending(gap_distance(a), gap_distance(b)).then(a.cmp(&b)));
    gap_stability.truncate(CANDIDATES_PER_RANKING);

    let mut sum_contribution = observed;
    sum_contribution.sort_by(|&a, &b| {
        ascending(contributions[a as usize], contributions[b as usize]).then(a.cmp(&b))
    });
    sum_contribution.truncate(CANDIDATES_PER_RANKING);

    RootRankings {
        frequency,
        gap_stability,
        sum_contribution,
    }
}

fn ascending(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract `n` root values from a window of draws.
pub fn extract_roots(window: &[Draw], n: usize) -> Result<RootSet> {
    if n == 0 || n > MAX_NUMBER as usize {
        return Err(RootShiftError::config(format!(
            "root count must be in 1..={MAX_NUMBER}, got {n}"
        )));
    }
    if window.is_empty() {
        return Err(RootShiftError::insufficient("root extraction", 1, 0));
    }

    let rankings = rank_candidates(window);

    let mut scored: Vec<(u8, usize)> = (1..=MAX_NUMBER)
        .map(|v| (v, rankings.votes(v)))
        .filter(|&(_, votes)| votes > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut roots: Vec<u8> = scored.iter().take(n).map(|&(v, _)| v).collect();

    // Shortfall: frequency order first, then the smallest unused values.
    let fillers = rankings.frequency.iter().copied().chain(1..=MAX_NUMBER);
    for v in fillers {
        if roots.len() >= n {
            break;
        }
        if !roots.contains(&v) {
            roots.push(v);
        }
    }

    Ok(RootSet::from_values(roots))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(values: [u8; 6]) -> Draw {
        Draw::new(&values).unwrap()
    }

    fn mixed_window() -> Vec<Draw> {
        vec![
            draw([1, 9, 17, 25, 33, 41]),
            draw([1, 9, 17, 25, 33, 42]),
            draw([2, 10, 18, 26, 34, 50]),
        ]
    }

    #[test]
    fn test_empty_window_is_insufficient() {
        let err = extract_roots(&[], 3).unwrap_err();
        assert_eq!(err, RootShiftError::insufficient("root extraction", 1, 0));
    }

    #[test]
    fn test_rejects_zero_roots() {
        let err = extract_roots(&mixed_window(), 0).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_rankings_on_mixed_window() {
        let rankings = rank_candidates(&mixed_window());
        assert_eq!(rankings.frequency, vec![1, 9, 17, 25, 33, 2, 10, 18, 26, 34]);
        assert_eq!(
            rankings.gap_stability,
            vec![9, 10, 17, 18, 25, 26, 33, 34, 41, 42]
        );
        assert_eq!(
            rankings.sum_contribution,
            vec![42, 41, 1, 2, 9, 10, 17, 18, 25, 26]
        );
        assert_eq!(rankings.votes(9), 3);
        assert_eq!(rankings.votes(33), 2);
        assert_eq!(rankings.votes(50), 0);
    }

    #[test]
    fn test_highest_votes_win_with_ascending_ties() {
        let window = mixed_window();
        assert_eq!(extract_roots(&window, 3).unwrap().values(), &[9, 10, 17]);
        assert_eq!(
            extract_roots(&window, 6).unwrap().values(),
            &[9, 10, 17, 18, 25, 26]
        );
    }

    #[test]
    fn test_repeated_set_yields_its_lowest_members() {
        let repeated = draw([5, 12, 23, 34, 45, 56]);
        let window = vec![repeated; 50];
        let roots = extract_roots(&window, 3).unwrap();
        assert_eq!(roots.values(), &[5, 12, 23]);
    }

    #[test]
    fn test_shortfall_fills_with_smallest_unused() {
        let window = vec![draw([10, 20, 30, 40, 50, 60])];
        let roots = extract_roots(&window, 8).unwrap();
        assert_eq!(roots.values(), &[1, 2, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_root_set_overlap() {
        let a = RootSet::from_values(vec![3, 1, 2]);
        let b = RootSet::from_values(vec![2, 3, 4]);
        assert_eq!(a.values(), &[1, 2, 3]);
        assert_eq!(a.overlap(&b), 2);
    }
}
