//! Nearest neighbor distance statistics over interest points.
//!
//! For every sampled point the distance to the closest *other* point of the
//! same set is computed with a k=2 query (the first hit is the point
//! itself). Points are sampled independently with probability
//! `1 / subsampling`, so large sets can be summarized cheaply. Sampling is
//! driven by a caller-provided RNG; seed it for reproducible results.

use nalgebra::Point3;
use rand::Rng;
use rayon::prelude::*;

use crate::algorithm::histogram::DistanceHistogram;
use crate::error::{Result, SpimError};
use crate::spatial::index::NearestNeighborIndex;
use crate::spatial::kdtree::KdTree;

/// Sub-sampling rate meaning "every point".
pub const NO_SUBSAMPLING: usize = 1;

pub fn validate_subsampling(subsampling: usize) -> Result<()> {
    if subsampling < 1 {
        return Err(SpimError::invalid_parameter("subsampling", "rate must be at least 1"));
    }
    Ok(())
}

/// Draw the positions of the points that enter the sample.
///
/// One uniform draw per point, kept when below `1 / subsampling`.
pub fn draw_sample<R: Rng + ?Sized>(
    n_points: usize,
    subsampling: usize,
    rng: &mut R,
) -> Vec<usize> {
    let take_probability = 1.0 / subsampling as f64;
    (0..n_points).filter(|_| rng.gen::<f64>() < take_probability).collect()
}

/// Distance from each sampled point to its nearest other indexed point.
///
/// Returns nothing for an index holding fewer than two points.
pub fn nearest_neighbor_distances<I>(index: &I, sample: &[usize]) -> Vec<f64>
where
    I: NearestNeighborIndex + Sync,
{
    if index.len() < 2 {
        return Vec::new();
    }

    sample
        .par_iter()
        .filter_map(|&i| {
            let hits = index.k_nearest(index.point(i), 2);
            hits.get(1).map(|hit| hit.distance)
        })
        .collect()
}

/// Sampled nearest neighbor distances of one point set, using index type `I`.
pub fn sample_distances_with<I, R>(
    points: Vec<Point3<f64>>,
    subsampling: usize,
    rng: &mut R,
) -> Result<Vec<f64>>
where
    I: NearestNeighborIndex + Sync,
    R: Rng + ?Sized,
{
    validate_subsampling(subsampling)?;
    let n_points = points.len();
    let index = I::build(points);
    let sample = draw_sample(n_points, subsampling, rng);
    log::debug!("sampled {} of {} points", sample.len(), n_points);
    Ok(nearest_neighbor_distances(&index, &sample))
}

/// Histogram of sampled nearest neighbor distances, using index type `I`.
pub fn analyze_with<I, R>(
    points: Vec<Point3<f64>>,
    subsampling: usize,
    bin_count: usize,
    unit: &str,
    rng: &mut R,
) -> Result<DistanceHistogram>
where
    I: NearestNeighborIndex + Sync,
    R: Rng + ?Sized,
{
    if bin_count < 1 {
        return Err(SpimError::invalid_parameter("bin_count", "at least one bin is required"));
    }
    let distances = sample_distances_with::<I, R>(points, subsampling, rng)?;
    DistanceHistogram::from_distances(distances, bin_count, unit)
}

/// Histogram of sampled nearest neighbor distances over a KD-tree.
///
/// `points` must already be in physical units.
pub fn analyze<R: Rng + ?Sized>(
    points: Vec<Point3<f64>>,
    subsampling: usize,
    bin_count: usize,
    unit: &str,
    rng: &mut R,
) -> Result<DistanceHistogram> {
    analyze_with::<KdTree, R>(points, subsampling, bin_count, unit, rng)
}

/// Like [`analyze`], but each group (typically one view) gets its own index
/// and the distances of all groups are pooled into one histogram.
///
/// Neighbors are only searched within a group. Groups are processed in
/// order, so a seeded RNG gives the same sample on every run.
pub fn analyze_groups<R: Rng + ?Sized>(
    groups: Vec<Vec<Point3<f64>>>,
    subsampling: usize,
    bin_count: usize,
    unit: &str,
    rng: &mut R,
) -> Result<DistanceHistogram> {
    if bin_count < 1 {
        return Err(SpimError::invalid_parameter("bin_count", "at least one bin is required"));
    }
    validate_subsampling(subsampling)?;

    let mut distances = Vec::new();
    for group in groups {
        distances.extend(sample_distances_with::<KdTree, R>(group, subsampling, rng)?);
    }

    DistanceHistogram::from_distances(distances, bin_count, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::index::LinearScan;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Points on a regular lattice with the given spacing.
    fn lattice(n: usize, spacing: f64) -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let (x, y, z) = (x as f64, y as f64, z as f64);
                    points.push(Point3::new(x * spacing, y * spacing, z * spacing));
                }
            }
        }
        points
    }

    #[test]
    fn test_every_point_without_subsampling() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = lattice(4, 2.5);
        let n = points.len();
        let h = analyze(points, 1, 10, "um", &mut rng).unwrap();

        assert_eq!(h.sample_size(), n);
        for d in &h.distances {
            assert!(d.is_finite() && *d > 0.0);
            assert_abs_diff_eq!(*d, 2.5, epsilon = 1e-12);
        }
        assert_eq!(h.counts.iter().sum::<usize>(), n);
    }

    #[test]
    fn test_single_point_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let h = analyze(vec![Point3::new(1.0, 2.0, 3.0)], 1, 100, "um", &mut rng).unwrap();
        assert!(h.is_empty());
        assert_eq!(h.min, None);
        assert_eq!(h.max, None);
    }

    #[test]
    fn test_no_points_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let h = analyze(Vec::new(), 3, 100, "um", &mut rng).unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = analyze(lattice(2, 1.0), 0, 10, "um", &mut rng).unwrap_err();
        assert!(matches!(err, SpimError::InvalidParameter { name: "subsampling", .. }));
        let err = analyze(lattice(2, 1.0), 1, 0, "um", &mut rng).unwrap_err();
        assert!(matches!(err, SpimError::InvalidParameter { name: "bin_count", .. }));
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let points = lattice(6, 1.0);
        let a = analyze(points.clone(), 4, 20, "um", &mut StdRng::seed_from_u64(11)).unwrap();
        let b = analyze(points, 4, 20, "um", &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_subsampling_reduces_sample() {
        let mut rng = StdRng::seed_from_u64(3);
        let sample = draw_sample(10_000, 10, &mut rng);
        assert!(sample.len() > 800 && sample.len() < 1200);
        assert!(sample.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_index_types_agree() {
        let points = lattice(3, 1.5);
        let mut rng = StdRng::seed_from_u64(1);
        let a = analyze_with::<KdTree, _>(points.clone(), 1, 5, "um", &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let b = analyze_with::<LinearScan, _>(points, 1, 5, "um", &mut rng).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.min, b.min);
    }

    #[test]
    fn test_groups_search_within_group_only() {
        let mut rng = StdRng::seed_from_u64(5);
        let first = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let second = vec![Point3::new(0.5, 0.0, 0.0), Point3::new(0.5, 4.0, 0.0)];
        let groups = vec![first, second, vec![Point3::origin()]];
        let h = analyze_groups(groups, 1, 4, "um", &mut rng).unwrap();

        assert_eq!(h.sample_size(), 4);
        assert_eq!(h.min, Some(4.0));
        assert_eq!(h.max, Some(10.0));
    }
}
