use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

use crate::error::{Result, SpimError};

/// Number of bins used when the caller does not ask for a specific count.
pub const DEFAULT_BIN_COUNT: usize = 100;

/// Equal-width histogram over a sample of nearest neighbor distances.
///
/// Built once and never mutated. An empty sample yields a histogram with all
/// counts zero and `min`/`max` unset, which callers must check before
/// plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceHistogram {
    pub unit: String,
    pub counts: Vec<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub distances: Vec<f64>,
}

impl DistanceHistogram {
    /// Bucket `distances` into `bin_count` bins spanning `[min, max]`.
    ///
    /// The maximum falls into the last bin. If all values are equal every
    /// value lands in the first bin.
    pub fn from_distances(
        distances: Vec<f64>,
        bin_count: usize,
        unit: impl Into<String>,
    ) -> Result<Self> {
        if bin_count < 1 {
            return Err(SpimError::invalid_parameter("bin_count", "at least one bin is required"));
        }
        if let Some(bad) = distances.iter().find(|d| !d.is_finite()) {
            return Err(SpimError::invalid_parameter(
                "distances",
                format!("non-finite distance {}", bad),
            ));
        }

        let unit = unit.into();
        let mut counts = vec![0usize; bin_count];

        if distances.is_empty() {
            return Ok(DistanceHistogram {
                unit,
                counts,
                min: None,
                max: None,
                mean: None,
                median: None,
                std_dev: None,
                distances,
            });
        }

        let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bin_count as f64;

        for &d in &distances {
            let bin = if width > 0.0 {
                (((d - min) / width).floor() as usize).min(bin_count - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }

        let mean = distances.iter().mean();
        let std_dev = if distances.len() > 1 { Some(distances.iter().std_dev()) } else { None };
        let median = Data::new(distances.clone()).median();

        Ok(DistanceHistogram {
            unit,
            counts,
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            median: Some(median),
            std_dev,
            distances,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Number of distances the histogram was built from.
    pub fn sample_size(&self) -> usize {
        self.distances.len()
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((max - min) / self.bin_count() as f64),
            _ => None,
        }
    }

    /// `bin_count + 1` edges from `min` to `max`; empty for an empty histogram.
    pub fn bin_edges(&self) -> Vec<f64> {
        match (self.min, self.bin_width()) {
            (Some(min), Some(width)) => (0..=self.bin_count())
                .map(|i| min + i as f64 * width)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Center of every bin, the x axis of a plot.
    pub fn bin_centers(&self) -> Vec<f64> {
        self.bin_edges().windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

impl fmt::Display for DistanceHistogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(
                f,
                "min distance={} {}, max distance={} {} (n={})",
                min,
                self.unit,
                max,
                self.unit,
                self.sample_size()
            ),
            _ => write!(f, "no distances (empty histogram)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_counts_sum_to_sample_size() {
        let distances: Vec<f64> = (0..97).map(|i| (i as f64 * 0.37).sin().abs() + 0.1).collect();
        for bins in [1, 2, 7, 100, 1000] {
            let h = DistanceHistogram::from_distances(distances.clone(), bins, "um").unwrap();
            assert_eq!(h.counts.iter().sum::<usize>(), h.sample_size());
            assert_eq!(h.bin_count(), bins);
        }
    }

    #[test]
    fn test_max_lands_in_last_bin() {
        let h = DistanceHistogram::from_distances(vec![0.0, 1.0, 2.0, 3.0, 4.0], 4, "um").unwrap();
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.min, Some(0.0));
        assert_eq!(h.max, Some(4.0));
        assert_eq!(h.bin_edges(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_constant_sample() {
        let h = DistanceHistogram::from_distances(vec![2.5; 6], 10, "um").unwrap();
        assert_eq!(h.counts[0], 6);
        assert_eq!(h.min, h.max);
        assert_eq!(h.std_dev, Some(0.0));
    }

    #[test]
    fn test_empty_sample() {
        let h = DistanceHistogram::from_distances(Vec::new(), 100, "um").unwrap();
        assert!(h.is_empty());
        assert_eq!(h.min, None);
        assert_eq!(h.max, None);
        assert!(h.bin_edges().is_empty());
        assert_eq!(h.counts.iter().sum::<usize>(), 0);
        assert_eq!(h.to_string(), "no distances (empty histogram)");
    }

    #[test]
    fn test_summary_statistics() {
        let h = DistanceHistogram::from_distances(vec![1.0, 2.0, 3.0, 4.0], 2, "um").unwrap();
        assert_abs_diff_eq!(h.mean.unwrap(), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(h.median.unwrap(), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(h.std_dev.unwrap(), 1.2909944487358056, epsilon = 1e-9);
        assert_eq!(h.bin_centers(), vec![1.75, 3.25]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(DistanceHistogram::from_distances(vec![1.0], 0, "um").is_err());
        assert!(DistanceHistogram::from_distances(vec![f64::NAN], 3, "um").is_err());
    }
}
