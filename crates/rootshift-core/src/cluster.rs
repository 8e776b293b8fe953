//! Feature-space helpers for cluster-based change detection: column
//! standardization, PCA projection and seeded k-means.
//!
//! Everything here is deterministic for a given input and RNG state.

use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};
use rand::Rng;
use rand::rngs::StdRng;

use crate::stats;

// ---------------------------------------------------------------------------
// Standardization and projection
// ---------------------------------------------------------------------------

/// Scale each column to zero mean and unit variance.
///
/// Zero-variance columns carry no information for clustering and are dropped.
pub fn standardize_columns(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(first.len());
    for col in 0..first.len() {
        let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
        match stats::z_normalize(&values, "feature column") {
            Ok(z) => columns.push(z),
            Err(err) => log::debug!("dropping feature column {col}: {err}"),
        }
    }
    (0..rows.len())
        .map(|r| columns.iter().map(|c| c[r]).collect())
        .collect()
}

/// Project centered rows onto their top `max_components` principal axes.
pub fn pca_project(rows: &[Vec<f64>], max_components: usize) -> Vec<Vec<f64>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let d = first.len();
    let components = max_components.min(d);
    if components == 0 {
        return vec![Vec::new(); rows.len()];
    }

    let n = rows.len();
    let data = DMatrix::from_fn(n, d, |r, c| rows[r][c]);
    let means = data.row_mean();
    let centered = DMatrix::from_fn(n, d, |r, c| data[(r, c)] - means[c]);
    let cov = centered.transpose() * &centered / n as f64;

    let eigen = SymmetricEigen::new(cov);
    let mut order: Vec<usize> = (0..d).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let axes = eigen.eigenvectors.select_columns(&order[..components]);
    let projected = centered * axes;
    projected
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

// ---------------------------------------------------------------------------
// k-means
// ---------------------------------------------------------------------------

/// Outcome of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

/// Lloyd's k-means with k-means++ seeding, keeping the lowest-inertia fit
/// over `restarts` initializations. Returns `None` when there are fewer
/// points than clusters.
pub fn kmeans(
    points: &[Vec<f64>],
    k: usize,
    restarts: usize,
    max_iter: usize,
    rng: &mut StdRng,
) -> Option<KMeansFit> {
    if k == 0 || points.len() < k {
        return None;
    }
    let mut best: Option<KMeansFit> = None;
    for _ in 0..restarts.max(1) {
        let centroids = plus_plus_init(points, k, rng);
        let fit = lloyd(points, centroids, max_iter);
        if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }
    best
}

fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| nearest(p, &centroids).1)
            .collect();
        let total: f64 = weights.iter().sum();
        let chosen = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            weights
                .iter()
                .position(|&w| {
                    acc += w;
                    acc >= target
                })
                .unwrap_or(points.len() - 1)
        } else {
            rng.random_range(0..points.len())
        };
        centroids.push(points[chosen].clone());
    }
    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize) -> KMeansFit {
    let k = centroids.len();
    let dims = points[0].len();
    let mut labels = vec![usize::MAX; points.len()];

    for _ in 0..max_iter.max(1) {
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points) {
            let (best, _) = nearest(point, &centroids);
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (&label, point) in labels.iter().zip(points) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(point) {
                *s += v;
            }
        }
        // An emptied cluster keeps its previous centroid.
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            }
        }
    }

    let inertia = points.iter().map(|p| nearest(p, &centroids).1).sum();
    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}

/// Index of the nearest centroid (lowest index on ties) and its squared distance.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d2: f64 = point.iter().zip(c).map(|(a, b)| (a - b) * (a - b)).sum();
        if d2 < best.1 {
            best = (i, d2);
        }
    }
    best
}
