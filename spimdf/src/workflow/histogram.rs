//! Nearest neighbor distance histograms per channel.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use spimcore::algorithm::histogram::{DistanceHistogram, DEFAULT_BIN_COUNT};
use spimcore::algorithm::nearest_neighbor::analyze_groups;
use spimcore::model::view::{ViewId, VoxelSize};

use crate::data::dataset::SpimDataset;
use crate::error::Result;
use crate::workflow::channels::ChannelProcess;

/// Where nearest neighbors are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighborScope {
    /// Within each view separately; distances of all views are pooled.
    #[default]
    PerView,
    /// Across all points of the channel merged into one set.
    Channel,
}

impl FromStr for NeighborScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "per-view" | "view" => Ok(NeighborScope::PerView),
            "channel" => Ok(NeighborScope::Channel),
            other => Err(format!(
                "unknown neighbor scope '{}', expected 'per-view' or 'channel'",
                other
            )),
        }
    }
}

impl fmt::Display for NeighborScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborScope::PerView => write!(f, "per-view"),
            NeighborScope::Channel => write!(f, "channel"),
        }
    }
}

/// Histogram settings shared by all channels. The sub-sampling rate is
/// chosen per channel, see [`ChannelProcess`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    pub bin_count: usize,
    pub scope: NeighborScope,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            scope: NeighborScope::PerView,
        }
    }
}

/// Distance histogram of one channel and label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelHistogram {
    pub channel: String,
    pub label: String,
    pub views: usize,
    pub histogram: DistanceHistogram,
}

impl ChannelHistogram {
    pub fn title(&self) -> String {
        format!("Distance Histogram [Channel={}]", self.channel)
    }
}

/// Compute the distance histogram for one channel over `views`.
///
/// Views of other channels, missing views and views without the requested
/// label are skipped.
pub fn channel_histogram<R: Rng + ?Sized>(
    dataset: &SpimDataset,
    views: &[ViewId],
    process: &ChannelProcess,
    config: &HistogramConfig,
    rng: &mut R,
) -> Result<ChannelHistogram> {
    let mut groups = Vec::new();
    let mut unit: Option<String> = None;

    for view in dataset.views_of_channel(views, process.channel.id) {
        let Some(setup) = dataset.view_setup(view) else {
            continue;
        };
        let Some(list) = dataset.interest_points.get(view, &process.label) else {
            log::warn!("No '{}' interest points for {}, skipping it", process.label, view);
            continue;
        };

        match &unit {
            None => unit = Some(setup.voxel_size.unit.clone()),
            Some(u) if *u != setup.voxel_size.unit => {
                log::warn!(
                    "{} is calibrated in '{}', expected '{}'",
                    view,
                    setup.voxel_size.unit,
                    u
                )
            }
            Some(_) => {}
        }

        log::debug!("{}: {} '{}' interest points", view, list.len(), process.label);
        groups.push(list.to_physical(&setup.voxel_size));
    }

    let n_views = groups.len();
    if config.scope == NeighborScope::Channel {
        groups = vec![groups.into_iter().flatten().collect()];
    }

    let unit = unit.unwrap_or_else(|| VoxelSize::default().unit);
    let histogram = analyze_groups(groups, process.subsampling, config.bin_count, &unit, rng)?;

    match (histogram.min, histogram.max) {
        (Some(min), Some(max)) => {
            log::info!(
                "Channel {}: min distance={}, max distance={}",
                process.channel.name,
                min,
                max
            )
        }
        _ => log::warn!("Channel {}: no nearest neighbor distances", process.channel.name),
    }

    Ok(ChannelHistogram {
        channel: process.channel.name.clone(),
        label: process.label.clone(),
        views: n_views,
        histogram,
    })
}

/// Histograms of all channels flagged for display, computed in parallel.
///
/// With a seed, channel `i` samples with `seed + i`, so results do not
/// depend on thread scheduling.
pub fn channel_histograms(
    dataset: &SpimDataset,
    views: &[ViewId],
    processes: &[ChannelProcess],
    config: &HistogramConfig,
    seed: Option<u64>,
) -> Result<Vec<ChannelHistogram>> {
    let shown: Vec<&ChannelProcess> = processes.iter().filter(|p| p.show_histogram).collect();

    shown
        .par_iter()
        .enumerate()
        .map(|(i, process)| {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_entropy(),
            };
            channel_histogram(dataset, views, process, config, &mut rng)
        })
        .collect()
}
