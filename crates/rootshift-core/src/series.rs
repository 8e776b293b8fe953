//! Scalar series derived from a draw sequence.
//!
//! Seven series are produced, one value per draw. Six are per-draw
//! statistics; `entropy` is cumulative: the Shannon entropy (bits) of the
//! per-number frequency distribution over every draw seen so far.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draw::{Draw, MAX_NUMBER};
use crate::stats;

// ---------------------------------------------------------------------------
// Series identity
// ---------------------------------------------------------------------------

/// Identifies one derived series. Declaration order is the processing order
/// used by every downstream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    #[serde(rename = "mean")]
    Mean,
    #[serde(rename = "stddev")]
    StdDev,
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "evenCount")]
    EvenCount,
    #[serde(rename = "amplitude")]
    Amplitude,
    #[serde(rename = "meanGap")]
    MeanGap,
    #[serde(rename = "entropy")]
    Entropy,
}

impl SeriesKind {
    /// Every series, in processing order.
    pub const ALL: [SeriesKind; 7] = [
        SeriesKind::Mean,
        SeriesKind::StdDev,
        SeriesKind::Sum,
        SeriesKind::EvenCount,
        SeriesKind::Amplitude,
        SeriesKind::MeanGap,
        SeriesKind::Entropy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SeriesKind::Mean => "mean",
            SeriesKind::StdDev => "stddev",
            SeriesKind::Sum => "sum",
            SeriesKind::EvenCount => "evenCount",
            SeriesKind::Amplitude => "amplitude",
            SeriesKind::MeanGap => "meanGap",
            SeriesKind::Entropy => "entropy",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Series keyed by kind; iteration follows [`SeriesKind::ALL`].
pub type SeriesMap = BTreeMap<SeriesKind, Vec<f64>>;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Derive all seven series. An empty sequence yields an empty map.
pub fn generate_series(draws: &[Draw]) -> SeriesMap {
    let mut map = SeriesMap::new();
    if draws.is_empty() {
        return map;
    }

    let m = draws.len();
    let mut means = Vec::with_capacity(m);
    let mut std_devs = Vec::with_capacity(m);
    let mut sums = Vec::with_capacity(m);
    let mut evens = Vec::with_capacity(m);
    let mut amplitudes = Vec::with_capacity(m);
    let mut gaps = Vec::with_capacity(m);
    let mut entropies = Vec::with_capacity(m);

    let mut counts = [0u64; MAX_NUMBER as usize + 1];
    let mut total = 0u64;

    for draw in draws {
        let values: Vec<f64> = draw.values().iter().map(|&v| f64::from(v)).collect();
        means.push(stats::mean(&values));
        std_devs.push(stats::std_dev(&values));
        sums.push(f64::from(draw.sum()));
        evens.push(draw.even_count() as f64);
        amplitudes.push(f64::from(draw.max() - draw.min()));
        gaps.push(stats::mean(&stats::diff(&values)));

        for &v in draw.values() {
            counts[v as usize] += 1;
            total += 1;
        }
        entropies.push(shannon_bits(&counts, total));
    }

    map.insert(SeriesKind::Mean, means);
    map.insert(SeriesKind::StdDev, std_devs);
    map.insert(SeriesKind::Sum, sums);
    map.insert(SeriesKind::EvenCount, evens);
    map.insert(SeriesKind::Amplitude, amplitudes);
    map.insert(SeriesKind::MeanGap, gaps);
    map.insert(SeriesKind::Entropy, entropies);
    map
}

/// Shannon entropy in bits of a count histogram.
fn shannon_bits(counts: &[u64], total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let mut h = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / n;
            h -= p * p.log2();
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(values: [u8; 6]) -> Draw {
        Draw::new(&values).unwrap()
    }

    #[test]
    fn test_empty_sequence_yields_empty_map() {
        assert!(generate_series(&[]).is_empty());
    }

    #[test]
    fn test_per_draw_statistics() {
        let draws = [draw([2, 4, 6, 8, 10, 12]), draw([1, 3, 5, 7, 9, 59])];
        let series = generate_series(&draws);
        assert_eq!(series.len(), 7);
        assert_eq!(series[&SeriesKind::Mean], vec![7.0, 14.0]);
        assert_eq!(series[&SeriesKind::Sum], vec![42.0, 84.0]);
        assert_eq!(series[&SeriesKind::EvenCount], vec![6.0, 0.0]);
        assert_eq!(series[&SeriesKind::Amplitude], vec![10.0, 58.0]);
        let gaps = &series[&SeriesKind::MeanGap];
        assert!((gaps[0] - 2.0).abs() < 1e-12);
        assert!((gaps[1] - 11.6).abs() < 1e-12);
        let sd = series[&SeriesKind::StdDev][0];
        assert!((sd - (70.0f64 / 6.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_is_cumulative() {
        let same = draw([1, 2, 3, 4, 5, 6]);
        let other = draw([7, 8, 9, 10, 11, 12]);
        let series = generate_series(&[same, same, other]);
        let entropy = &series[&SeriesKind::Entropy];
        // Six equally likely numbers, unchanged by a repeat, then twelve.
        assert!((entropy[0] - 6f64.log2()).abs() < 1e-12);
        assert!((entropy[1] - 6f64.log2()).abs() < 1e-12);
        let p_old: f64 = 2.0 / 18.0;
        let p_new: f64 = 1.0 / 18.0;
        let expected = -(6.0 * p_old * p_old.log2() + 6.0 * p_new * p_new.log2());
        assert!((entropy[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_follows_declared_order() {
        let series = generate_series(&[draw([1, 2, 3, 4, 5, 6])]);
        let keys: Vec<SeriesKind> = series.keys().copied().collect();
        assert_eq!(keys, SeriesKind::ALL.to_vec());
    }

    #[test]
    fn test_kind_serializes_with_series_name() {
        for kind in SeriesKind::ALL {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.name()));
        }
    }
}
