//! Seeded k-means over 3-D points with graceful degradation of `k`.
//!
//! Initial centroids are `k` distinct observations drawn from a seeded RNG,
//! so a run is reproducible. Lloyd iterations stop once the mean distance
//! to the nearest centroid changes by less than the threshold. Clusters
//! that lose all members are dropped. The best of several restarts wins.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::stats::euclidean;

pub type Point = [f64; 3];

/// Result of one successful clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centroids: Vec<Point>,
    /// Members per centroid, same order as `centroids`.
    pub sizes: Vec<usize>,
    /// Mean Euclidean distance from each point to its nearest centroid.
    pub distortion: f64,
}

impl Clustering {
    /// Centroid of the most populated cluster.
    #[must_use]
    pub fn dominant(&self) -> Option<Point> {
        self.sizes
            .iter()
            .enumerate()
            .max_by_key(|(_, size)| **size)
            .and_then(|(i, _)| self.centroids.get(i).copied())
    }
}

/// Terminal state of [`KMeans::fit_degrading`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOutcome {
    Converged {
        k: usize,
        clustering: Clustering,
        /// Every `k` tried, in order, ending with the one that converged.
        attempts: Vec<usize>,
    },
    /// No `k` down to 1 was feasible.
    Failed { attempts: Vec<usize> },
}

impl ClusterOutcome {
    #[must_use]
    pub fn clustering(&self) -> Option<&Clustering> {
        match self {
            ClusterOutcome::Converged { clustering, .. } => Some(clustering),
            ClusterOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> &[usize] {
        match self {
            ClusterOutcome::Converged { attempts, .. } | ClusterOutcome::Failed { attempts } => {
                attempts
            }
        }
    }
}

enum State {
    Trying(usize),
    Converged(usize, Clustering),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub restarts: usize,
    pub max_iterations: usize,
    pub threshold: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            restarts: 20,
            max_iterations: 100,
            threshold: 1e-5,
            seed: 0x1f_2a_3b_4c,
        }
    }
}

impl KMeans {
    /// Clusters `points` into at most `k` groups.
    ///
    /// Returns `None` when `k` is zero or exceeds the number of distinct
    /// points, since `k` distinct initial centroids cannot be drawn.
    #[must_use]
    pub fn fit(&self, points: &[Point], k: usize) -> Option<Clustering> {
        let distinct = distinct_points(points);
        if k == 0 || k > distinct.len() {
            return None;
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Clustering> = None;
        for _ in 0..self.restarts.max(1) {
            let initial: Vec<Point> = rand::seq::index::sample(&mut rng, distinct.len(), k)
                .into_iter()
                .map(|i| distinct[i])
                .collect();
            let candidate = self.lloyd(points, initial);
            if best
                .as_ref()
                .is_none_or(|b| candidate.distortion < b.distortion)
            {
                best = Some(candidate);
            }
        }
        best
    }

    /// Tries `target_k`, then `target_k - 1`, and so on down to 1, stopping
    /// at the first feasible `k`.
    #[must_use]
    pub fn fit_degrading(&self, points: &[Point], target_k: usize) -> ClusterOutcome {
        let mut attempts = Vec::new();
        let mut state = State::Trying(target_k);
        loop {
            state = match state {
                State::Trying(0) => State::Failed,
                State::Trying(k) => {
                    attempts.push(k);
                    match self.fit(points, k) {
                        Some(clustering) => State::Converged(k, clustering),
                        None => {
                            tracing::debug!(k, points = points.len(), "k-means infeasible, lowering k");
                            State::Trying(k - 1)
                        }
                    }
                }
                State::Converged(k, clustering) => {
                    return ClusterOutcome::Converged {
                        k,
                        clustering,
                        attempts,
                    }
                }
                State::Failed => return ClusterOutcome::Failed { attempts },
            };
        }
    }

    fn lloyd(&self, points: &[Point], mut centroids: Vec<Point>) -> Clustering {
        let mut previous = f64::INFINITY;
        let mut iteration = 0;
        loop {
            let (assignment, distortion) = assign(points, &centroids);
            iteration += 1;
            if (previous - distortion).abs() <= self.threshold || iteration >= self.max_iterations {
                let sizes = cluster_sizes(&assignment, centroids.len());
                return Clustering {
                    centroids,
                    sizes,
                    distortion,
                };
            }
            previous = distortion;
            centroids = recompute(points, &assignment, centroids.len());
        }
    }
}

fn distinct_points(points: &[Point]) -> Vec<Point> {
    let mut seen: HashSet<[u64; 3]> = HashSet::new();
    points
        .iter()
        .filter(|p| p.iter().all(|v| v.is_finite()))
        .filter(|p| seen.insert([p[0].to_bits(), p[1].to_bits(), p[2].to_bits()]))
        .copied()
        .collect()
}

/// Nearest centroid index per point, and the mean distance to it.
fn assign(points: &[Point], centroids: &[Point]) -> (Vec<usize>, f64) {
    let mut total = 0.0;
    let assignment = points
        .iter()
        .map(|p| {
            let (idx, dist) = centroids
                .iter()
                .enumerate()
                .map(|(i, c)| (i, euclidean(p, c)))
                .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });
            total += dist;
            idx
        })
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let distortion = if points.is_empty() {
        0.0
    } else {
        total / points.len() as f64
    };
    (assignment, distortion)
}

/// Member means; clusters with no members are dropped.
fn recompute(points: &[Point], assignment: &[usize], k: usize) -> Vec<Point> {
    let mut sums = vec![[0.0_f64; 3]; k];
    let mut counts = vec![0usize; k];
    for (p, &c) in points.iter().zip(assignment) {
        for d in 0..3 {
            sums[c][d] += p[d];
        }
        counts[c] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(s, n)| {
            #[allow(clippy::cast_precision_loss)]
            let n = n as f64;
            [s[0] / n, s[1] / n, s[2] / n]
        })
        .collect()
}

fn cluster_sizes(assignment: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &c in assignment {
        sizes[c] += 1;
    }
    sizes
}
