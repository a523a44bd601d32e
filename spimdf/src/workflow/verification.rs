//! Sanity check of interest point detections.
//!
//! Over-segmentation with default detection parameters can produce millions
//! of points per view, and a failed detection produces none. Every
//! (channel, view, label) count is checked and suspicious ones are reported.

use serde::{Deserialize, Serialize};

use spimcore::algorithm::verification::{classify_count, CountVerdict, UPPER_THRESHOLD};
use spimcore::model::view::ViewId;

use crate::data::dataset::SpimDataset;
use crate::error::{DatasetError, Result};
use crate::workflow::channels::labels_for_channel;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub upper_threshold: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { upper_threshold: UPPER_THRESHOLD }
    }
}

/// A count outside the reasonable range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedCount {
    pub channel: String,
    pub angle: String,
    pub view: ViewId,
    pub label: String,
    pub count: usize,
    pub verdict: CountVerdict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub checked: usize,
    pub flagged: Vec<FlaggedCount>,
}

impl VerificationReport {
    pub fn is_reasonable(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Check the interest point count of every label in every view of `channels`.
///
/// A label stored for some views of a channel but not for others counts as
/// zero points in the views lacking it.
pub fn verify_detections(
    dataset: &SpimDataset,
    views: &[ViewId],
    channels: &[u32],
    config: &VerificationConfig,
) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();

    for &channel_id in channels {
        let channel = dataset
            .sequence
            .channel(channel_id)
            .ok_or(DatasetError::UnknownChannel(channel_id))?;
        let labels = labels_for_channel(dataset, views, channel_id);

        for view in dataset.views_of_channel(views, channel_id) {
            let angle = dataset
                .view_setup(view)
                .and_then(|setup| dataset.sequence.angle(setup.angle))
                .map(|a| a.name.clone())
                .unwrap_or_default();

            for label in &labels {
                let count = dataset
                    .interest_points
                    .get(view, &label.label)
                    .map(|l| l.len())
                    .unwrap_or(0);
                let verdict = classify_count(count, config.upper_threshold);
                report.checked += 1;

                if verdict.is_reasonable() {
                    continue;
                }

                log::warn!(
                    "{} at ch: {} angle: {} label: {}: {}",
                    verdict,
                    channel.name,
                    angle,
                    label.label,
                    count
                );
                report.flagged.push(FlaggedCount {
                    channel: channel.name.clone(),
                    angle: angle.clone(),
                    view,
                    label: label.label.clone(),
                    count,
                    verdict,
                });
            }
        }
    }

    Ok(report)
}
