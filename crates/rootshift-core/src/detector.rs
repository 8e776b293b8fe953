//! Change-point detection over the derived series.
//!
//! Two detectors feed one suppression-aware set of accepted points:
//!
//! - **Peaks**: z-scored first differences of each series; an extreme
//!   difference (either sign) beyond the sensitivity marks a shift.
//! - **Clustering**: per-draw feature rows are standardized, projected onto
//!   their principal axes and clustered with seeded k-means; every change of
//!   cluster label between consecutive rows marks a shift.
//!
//! A candidate is accepted only when no already-accepted point lies strictly
//! closer than the merge radius, so earlier series and the peak detector take
//! precedence over later ones.

use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::cluster;
use crate::error::{Result, RootShiftError};
use crate::series::{SeriesKind, SeriesMap};
use crate::stats;

/// Feature rows needed per k-means cluster.
const ROWS_PER_CLUSTER: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which detector produced (or should produce) change points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Peaks,
    Clustering,
    #[default]
    Combined,
}

impl DetectionMethod {
    pub fn name(self) -> &'static str {
        match self {
            DetectionMethod::Peaks => "peaks",
            DetectionMethod::Clustering => "clustering",
            DetectionMethod::Combined => "combined",
        }
    }

    fn runs_peaks(self) -> bool {
        matches!(self, DetectionMethod::Peaks | DetectionMethod::Combined)
    }

    fn runs_clustering(self) -> bool {
        matches!(self, DetectionMethod::Clustering | DetectionMethod::Combined)
    }
}

impl FromStr for DetectionMethod {
    type Err = RootShiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "peaks" => Ok(DetectionMethod::Peaks),
            "clustering" | "kmeans" => Ok(DetectionMethod::Clustering),
            "combined" => Ok(DetectionMethod::Combined),
            other => Err(RootShiftError::config(format!(
                "unknown detection method '{other}' (expected peaks, clustering or combined)"
            ))),
        }
    }
}

/// The signal a change point was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Series(SeriesKind),
    Cluster,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Series(kind) => write!(f, "{kind}"),
            Signal::Cluster => f.write_str("cluster"),
        }
    }
}

/// A detected regime shift at draw `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub index: usize,
    pub signal: Signal,
    /// Series value (or cluster label) at `index - 1`.
    pub value_before: f64,
    /// Series value (or cluster label) at `index`.
    pub value_after: f64,
    pub method: DetectionMethod,
}

/// Detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum |z| of a first difference for a peak candidate.
    pub sensitivity: f64,
    pub method: DetectionMethod,
    /// Accepted points are at least this many draws apart.
    pub merge_radius: usize,
    /// Feature rows start at this draw index.
    pub min_history: usize,
    pub max_clusters: usize,
    pub max_components: usize,
    pub seed: u64,
    pub kmeans_restarts: usize,
    pub kmeans_max_iter: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.5,
            method: DetectionMethod::Combined,
            merge_radius: 5,
            min_history: 10,
            max_clusters: 5,
            max_components: 3,
            seed: 42,
            kmeans_restarts: 10,
            kmeans_max_iter: 300,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(RootShiftError::config(format!(
                "sensitivity must be a positive number, got {}",
                self.sensitivity
            )));
        }
        if self.merge_radius == 0 {
            return Err(RootShiftError::config("merge_radius must be at least 1"));
        }
        if self.max_clusters < 2 {
            return Err(RootShiftError::config(format!(
                "max_clusters must be at least 2, got {}",
                self.max_clusters
            )));
        }
        if self.max_components == 0 {
            return Err(RootShiftError::config("max_components must be at least 1"));
        }
        if self.kmeans_restarts == 0 || self.kmeans_max_iter == 0 {
            return Err(RootShiftError::config(
                "kmeans_restarts and kmeans_max_iter must be at least 1",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detect change points across all series, sorted by index.
pub fn detect_change_points(
    series: &SeriesMap,
    config: &DetectorConfig,
) -> Result<Vec<ChangePoint>> {
    config.validate()?;

    let mut accepted = Accepted::new(config.merge_radius);
    if config.method.runs_peaks() {
        detect_peak_shifts(series, config.sensitivity, &mut accepted);
    }
    let from_peaks = accepted.points.len();
    if config.method.runs_clustering() {
        detect_cluster_shifts(series, config, &mut accepted);
    }

    let mut points = accepted.points;
    points.sort_by_key(|cp| cp.index);
    log::info!(
        "detected {} change points ({} from peaks, {} from clustering)",
        points.len(),
        from_peaks,
        points.len() - from_peaks
    );
    Ok(points)
}

/// Accepted points plus the merge-radius suppression rule.
struct Accepted {
    radius: usize,
    points: Vec<ChangePoint>,
}

impl Accepted {
    fn new(radius: usize) -> Self {
        Self {
            radius,
            points: Vec::new(),
        }
    }

    fn offer(&mut self, candidate: ChangePoint) -> bool {
        let crowded = self
            .points
            .iter()
            .any(|p| p.index.abs_diff(candidate.index) < self.radius);
        if !crowded {
            self.points.push(candidate);
        }
        !crowded
    }
}

fn detect_peak_shifts(series: &SeriesMap, sensitivity: f64, accepted: &mut Accepted) {
    for (&kind, values) in series {
        let z = match stats::z_normalize(&stats::diff(values), kind.name()) {
            Ok(z) => z,
            Err(err) => {
                log::debug!("peaks: skipping {kind}: {err}");
                continue;
            }
        };
        let negated: Vec<f64> = z.iter().map(|v| -v).collect();

        let mut extremes = stats::find_peaks(&z, sensitivity);
        extremes.extend(stats::find_peaks(&negated, sensitivity));
        extremes.sort_unstable();

        for j in extremes {
            let index = j + 1;
            accepted.offer(ChangePoint {
                index,
                signal: Signal::Series(kind),
                value_before: values[index - 1],
                value_after: values[index],
                method: DetectionMethod::Peaks,
            });
        }
    }
}

fn detect_cluster_shifts(series: &SeriesMap, config: &DetectorConfig, accepted: &mut Accepted) {
    let m = series.values().map(Vec::len).min().unwrap_or(0);
    if m <= config.min_history {
        log::debug!("clustering: {m} draws leave no rows after {} of history", config.min_history);
        return;
    }

    let rows: Vec<Vec<f64>> = (config.min_history..m)
        .map(|i| series.values().map(|values| values[i]).collect())
        .collect();
    let k = config.max_clusters.min(rows.len() / ROWS_PER_CLUSTER);
    if k < 2 {
        log::debug!("clustering: {} rows support fewer than 2 clusters", rows.len());
        return;
    }

    let standardized = cluster::standardize_columns(&rows);
    if standardized.first().is_none_or(|r| r.is_empty()) {
        log::debug!("clustering: every feature column has zero variance");
        return;
    }
    let projected = cluster::pca_project(&standardized, config.max_components);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let Some(fit) = cluster::kmeans(
        &projected,
        k,
        config.kmeans_restarts,
        config.kmeans_max_iter,
        &mut rng,
    ) else {
        return;
    };
    log::debug!("clustering: k={k}, inertia={:.4}", fit.inertia);

    for (r, pair) in fit.labels.windows(2).enumerate() {
        if pair[0] != pair[1] {
            accepted.offer(ChangePoint {
                index: r + 1 + config.min_history,
                signal: Signal::Cluster,
                value_before: pair[0] as f64,
                value_after: pair[1] as f64,
                method: DetectionMethod::Clustering,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(kind: SeriesKind, values: Vec<f64>) -> SeriesMap {
        let mut map = SeriesMap::new();
        map.insert(kind, values);
        map
    }

    fn step_series() -> Vec<f64> {
        // Small alternating noise with a jump of 40 at index 30.
        (0..60)
            .map(|i| {
                let noise = if i % 2 == 0 { 0.5 } else { -0.5 };
                if i < 30 { 10.0 + noise } else { 50.0 + noise }
            })
            .collect()
    }

    fn peaks_only() -> DetectorConfig {
        DetectorConfig {
            method: DetectionMethod::Peaks,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let series = single(SeriesKind::Mean, step_series());
        let configs = [
            DetectorConfig {
                sensitivity: 0.0,
                ..DetectorConfig::default()
            },
            DetectorConfig {
                sensitivity: f64::NAN,
                ..DetectorConfig::default()
            },
            DetectorConfig {
                merge_radius: 0,
                ..DetectorConfig::default()
            },
            DetectorConfig {
                max_clusters: 1,
                ..DetectorConfig::default()
            },
        ];
        for config in configs {
            let err = detect_change_points(&series, &config).unwrap_err();
            assert_eq!(err.kind(), "configuration");
        }
    }

    #[test]
    fn test_peak_marks_step() {
        let series = single(SeriesKind::Mean, step_series());
        let points = detect_change_points(&series, &peaks_only()).unwrap();
        assert_eq!(points.len(), 1);
        let cp = &points[0];
        assert_eq!(cp.index, 30);
        assert_eq!(cp.signal, Signal::Series(SeriesKind::Mean));
        assert_eq!(cp.method, DetectionMethod::Peaks);
        assert_eq!(cp.value_before, 9.5);
        assert_eq!(cp.value_after, 50.5);
    }

    #[test]
    fn test_downward_step_is_detected() {
        let falling: Vec<f64> = step_series().iter().map(|v| 100.0 - v).collect();
        let series = single(SeriesKind::Sum, falling);
        let points = detect_change_points(&series, &peaks_only()).unwrap();
        assert_eq!(points.iter().map(|p| p.index).collect::<Vec<_>>(), vec![30]);
    }

    #[test]
    fn test_constant_series_is_skipped() {
        let series = single(SeriesKind::EvenCount, vec![3.0; 40]);
        let points = detect_change_points(&series, &DetectorConfig::default()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_later_series_are_suppressed_near_accepted_points() {
        let mut series = single(SeriesKind::Mean, step_series());
        // Same shift two draws later in a later series.
        let mut shifted = step_series();
        shifted.rotate_right(2);
        shifted[0] = 10.5;
        shifted[1] = 9.5;
        series.insert(SeriesKind::Amplitude, shifted);

        let points = detect_change_points(&series, &peaks_only()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].signal, Signal::Series(SeriesKind::Mean));
    }

    #[test]
    fn test_clustering_finds_level_shift() {
        let mut series = SeriesMap::new();
        series.insert(SeriesKind::Mean, step_series());
        let mut second = step_series();
        second.iter_mut().for_each(|v| *v *= 2.0);
        series.insert(SeriesKind::Sum, second);

        let config = DetectorConfig {
            method: DetectionMethod::Clustering,
            max_clusters: 2,
            ..DetectorConfig::default()
        };
        let points = detect_change_points(&series, &config).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].index, 30);
        assert_eq!(points[0].signal, Signal::Cluster);
        assert_eq!(points[0].method, DetectionMethod::Clustering);
        assert_ne!(points[0].value_before, points[0].value_after);
    }

    #[test]
    fn test_clustering_needs_enough_rows() {
        let short: Vec<f64> = step_series().into_iter().take(25).collect();
        let series = single(SeriesKind::Mean, short);
        let config = DetectorConfig {
            method: DetectionMethod::Clustering,
            ..DetectorConfig::default()
        };
        assert!(detect_change_points(&series, &config).unwrap().is_empty());
    }

    #[test]
    fn test_points_are_sorted_and_separated() {
        let values: Vec<f64> = (0..120)
            .map(|i| if (i / 20) % 2 == 0 { 5.0 } else { 25.0 } + (i % 3) as f64 * 0.1)
            .collect();
        let series = single(SeriesKind::Mean, values);
        let points = detect_change_points(&series, &DetectorConfig::default()).unwrap();
        assert!(!points.is_empty());
        for pair in points.windows(2) {
            assert!(pair[1].index > pair[0].index);
            assert!(pair[1].index - pair[0].index >= 5);
        }
    }

    #[test]
    fn test_method_parses_from_str() {
        assert_eq!("Peaks".parse::<DetectionMethod>().unwrap(), DetectionMethod::Peaks);
        assert_eq!("kmeans".parse::<DetectionMethod>().unwrap(), DetectionMethod::Clustering);
        assert!("magic".parse::<DetectionMethod>().is_err());
    }
}
