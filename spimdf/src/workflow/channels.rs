//! Which interest point label to analyze for each channel.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use spimcore::algorithm::nearest_neighbor::NO_SUBSAMPLING;
use spimcore::model::entity::Entity;
use spimcore::model::view::ViewId;

use crate::data::dataset::SpimDataset;
use crate::error::{DatasetError, Result};

/// A label and how many of a channel's views carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelAvailability {
    pub label: String,
    pub views_with_label: usize,
    pub views_total: usize,
}

impl LabelAvailability {
    /// True when every view of the channel has a list under this label.
    pub fn is_complete(&self) -> bool {
        self.views_with_label == self.views_total
    }
}

impl fmt::Display for LabelAvailability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_complete() {
            write!(f, "{}", self.label)
        } else {
            write!(
                f,
                "{} (WARNING: only available for {} of {} views)",
                self.label, self.views_with_label, self.views_total
            )
        }
    }
}

/// Labels found in the present views of `channel`, sorted by name.
pub fn labels_for_channel(
    dataset: &SpimDataset,
    views: &[ViewId],
    channel: u32,
) -> Vec<LabelAvailability> {
    let channel_views = dataset.views_of_channel(views, channel);
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for view in &channel_views {
        for label in dataset.interest_points.labels(*view) {
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(label, n)| LabelAvailability {
            label: label.to_string(),
            views_with_label: n,
            views_total: channel_views.len(),
        })
        .collect()
}

/// One channel to analyze with the chosen label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelProcess {
    pub channel: Entity,
    pub label: String,
    pub show_histogram: bool,
    pub subsampling: usize,
}

impl ChannelProcess {
    pub fn new(channel: Entity, label: impl Into<String>) -> Self {
        ChannelProcess {
            channel,
            label: label.into(),
            show_histogram: true,
            subsampling: NO_SUBSAMPLING,
        }
    }

    pub fn with_subsampling(mut self, subsampling: usize) -> Self {
        self.subsampling = subsampling;
        self
    }
}

/// Pick a label for every channel in `views`.
///
/// With `label` given it must exist for each channel. Otherwise the first
/// label present in all views of the channel is used, falling back to the
/// first label at all; channels without interest points are skipped.
pub fn choose_channel_processes(
    dataset: &SpimDataset,
    views: &[ViewId],
    label: Option<&str>,
    subsampling: usize,
) -> Result<Vec<ChannelProcess>> {
    let mut processes = Vec::new();

    for channel in dataset.channels_of(views) {
        let labels = labels_for_channel(dataset, views, channel.id);

        let chosen = match label {
            Some(wanted) => match labels.iter().find(|l| l.label == wanted) {
                Some(found) => found.clone(),
                None => {
                    return Err(DatasetError::UnknownLabel {
                        channel: channel.name.clone(),
                        label: wanted.to_string(),
                    })
                }
            },
            None => match labels.iter().find(|l| l.is_complete()).or_else(|| labels.first()) {
                Some(found) => found.clone(),
                None => {
                    log::warn!("Channel {} has no interest points, skipping it", channel.name);
                    continue;
                }
            },
        };

        if !chosen.is_complete() {
            log::warn!("Channel {}: {}", channel.name, chosen);
        }

        processes.push(ChannelProcess::new(channel, chosen.label).with_subsampling(subsampling));
    }

    Ok(processes)
}
