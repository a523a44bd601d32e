//! Nearest neighbor search capability.
//!
//! The histogram engine only needs "build an index over a point set" and
//! "give me the k closest points to this query". Any structure providing
//! both can be plugged in through [`NearestNeighborIndex`].

use nalgebra::{distance, Point3};
use serde::Serialize;

/// One search hit: position of the point in the indexed set and its
/// Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

pub trait NearestNeighborIndex: Sized {
    /// Build a static index over `points`.
    fn build(points: Vec<Point3<f64>>) -> Self;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The indexed point at `index` (position in the input of `build`).
    fn point(&self, index: usize) -> &Point3<f64>;

    /// Up to `k` neighbors of `query`, ordered by ascending distance.
    ///
    /// If `query` is itself an indexed point it is returned first with
    /// distance 0.
    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor>;
}

/// Exhaustive search over all points. O(n) per query.
#[derive(Debug, Clone)]
pub struct LinearScan {
    points: Vec<Point3<f64>>,
}

impl NearestNeighborIndex for LinearScan {
    fn build(points: Vec<Point3<f64>>) -> Self {
        LinearScan { points }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> &Point3<f64> {
        &self.points[index]
    }

    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor> {
        let mut hits: Vec<Neighbor> = self
            .points
            .iter()
            .enumerate()
            .map(|(index, p)| Neighbor { index, distance: distance(query, p) })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        hits.truncate(k);
        hits
    }
}
