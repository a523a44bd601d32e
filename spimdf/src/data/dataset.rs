use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use spimcore::model::entity::Entity;
use spimcore::model::interest_point::{InterestPointList, ViewInterestPoints};
use spimcore::model::sequence::SequenceDescription;
use spimcore::model::view::{ViewId, ViewSetup};

use crate::error::{DatasetError, Result};

/// Interest point lists of one view as stored in the dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewInterestPointsEntry {
    pub view: ViewId,
    #[serde(default)]
    pub lists: Vec<InterestPointList>,
}

/// Number of transforms registered for one view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRegistrationEntry {
    pub view: ViewId,
    pub transform_count: usize,
}

/// On-disk JSON layout of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub sequence: SequenceDescription,
    #[serde(default)]
    pub interest_points: Vec<ViewInterestPointsEntry>,
    #[serde(default)]
    pub registrations: Vec<ViewRegistrationEntry>,
}

/// A loaded dataset: sequence description, interest points and registrations.
#[derive(Debug, Clone)]
pub struct SpimDataset {
    pub sequence: SequenceDescription,
    pub interest_points: ViewInterestPoints,
    pub registrations: BTreeMap<ViewId, usize>,
}

impl SpimDataset {
    pub fn new(sequence: SequenceDescription, interest_points: ViewInterestPoints) -> Self {
        SpimDataset { sequence: sequence.index(), interest_points, registrations: BTreeMap::new() }
    }

    pub fn from_document(document: DatasetDocument) -> Result<Self> {
        let mut interest_points = ViewInterestPoints::new();
        for entry in document.interest_points {
            for list in entry.lists {
                interest_points.insert(entry.view, list);
            }
        }

        let registrations = document
            .registrations
            .into_iter()
            .map(|r| (r.view, r.transform_count))
            .collect();

        let dataset = SpimDataset {
            sequence: document.sequence.index(),
            interest_points,
            registrations,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: DatasetDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Load a dataset document from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&text)?;
        log::info!("Loaded '{}': {}", path.display(), dataset.sequence.summary());
        Ok(dataset)
    }

    /// Ids must be unique per dimension and view setups must reference known entities.
    pub fn validate(&self) -> Result<()> {
        let seq = &self.sequence;

        let check_unique = |what: &str, ids: Vec<u32>| -> Result<()> {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(DatasetError::Invalid(format!("duplicate {} id {}", what, id)));
                }
            }
            Ok(())
        };
        let ids = |entities: &[Entity]| entities.iter().map(|e| e.id).collect::<Vec<_>>();

        check_unique("timepoint", ids(&seq.time_points))?;
        check_unique("channel", ids(&seq.channels))?;
        check_unique("angle", ids(&seq.angles))?;
        check_unique("illumination", ids(&seq.illuminations))?;
        check_unique("viewsetup", seq.view_setups.iter().map(|s| s.id).collect())?;

        for setup in &seq.view_setups {
            let known = seq.channel(setup.channel).is_some()
                && seq.angle(setup.angle).is_some()
                && seq.illuminations.iter().any(|i| i.id == setup.illumination);
            if !known {
                return Err(DatasetError::Invalid(format!(
                    "viewsetup {} references an unknown channel, angle or illumination",
                    setup.id
                )));
            }
        }

        for view in self.interest_points.views() {
            if seq.view_description(*view).is_none() {
                return Err(DatasetError::Invalid(format!(
                    "interest points stored for unknown {}",
                    view
                )));
            }
        }

        Ok(())
    }

    pub fn view_setup(&self, view: ViewId) -> Option<&ViewSetup> {
        self.sequence.view_setup(view.view_setup)
    }

    /// Channels occurring in `views`, ordered as in the sequence description.
    pub fn channels_of(&self, views: &[ViewId]) -> Vec<Entity> {
        let used: HashSet<u32> = views
            .iter()
            .filter_map(|v| self.view_setup(*v))
            .map(|setup| setup.channel)
            .collect();
        self.sequence.channels.iter().filter(|c| used.contains(&c.id)).cloned().collect()
    }

    /// Present views in `views` that belong to `channel`.
    pub fn views_of_channel(&self, views: &[ViewId], channel: u32) -> Vec<ViewId> {
        views
            .iter()
            .copied()
            .filter(|v| self.sequence.is_present(*v))
            .filter(|v| self.view_setup(*v).map(|s| s.channel == channel).unwrap_or(false))
            .collect()
    }

    /// Largest number of transforms registered for any of `views`.
    pub fn max_registration_count(&self, views: &[ViewId]) -> usize {
        views
            .iter()
            .map(|v| {
                let count = self.registrations.get(v).copied().unwrap_or(0);
                log::debug!("{} {}", v, count);
                count
            })
            .max()
            .unwrap_or(0)
    }

    pub fn has_more_than_one_registration(&self, views: &[ViewId]) -> bool {
        self.max_registration_count(views) > 1
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SMALL_DATASET: &str = r#"{
        "sequence": {
            "time_points": [{"id": 0, "name": "1"}, {"id": 1, "name": "2"}],
            "channels": [{"id": 0, "name": "488"}, {"id": 1, "name": "561"}],
            "angles": [{"id": 0, "name": "0"}],
            "illuminations": [{"id": 0, "name": "0"}],
            "view_setups": [
                {"id": 0, "name": "a", "channel": 0, "angle": 0, "illumination": 0,
                 "voxel_size": {"unit": "um", "dimensions": [1.0, 1.0, 2.0]}},
                {"id": 1, "name": "b", "channel": 1, "angle": 0, "illumination": 0}
            ],
            "missing_views": [{"time_point": 1, "view_setup": 1}]
        },
        "interest_points": [
            {"view": {"time_point": 0, "view_setup": 0}, "lists": [
                {"label": "beads", "points": [
                    {"id": 0, "location": [0.0, 0.0, 0.0]},
                    {"id": 1, "location": [3.0, 0.0, 0.0]},
                    {"id": 2, "location": [0.0, 0.0, 2.0]}
                ]}
            ]},
            {"view": {"time_point": 1, "view_setup": 0}, "lists": [
                {"label": "beads", "points": [
                    {"id": 0, "location": [0.0, 0.0, 0.0]},
                    {"id": 1, "location": [0.0, 5.0, 0.0]}
                ]},
                {"label": "nuclei", "points": []}
            ]},
            {"view": {"time_point": 0, "view_setup": 1}, "lists": [
                {"label": "beads", "points": [{"id": 0, "location": [1.0, 1.0, 1.0]}]}
            ]}
        ],
        "registrations": [
            {"view": {"time_point": 0, "view_setup": 0}, "transform_count": 2},
            {"view": {"time_point": 1, "view_setup": 0}, "transform_count": 1}
        ]
    }"#;

    #[test]
    fn test_load_document() {
        let dataset = SpimDataset::from_json_str(SMALL_DATASET).unwrap();
        assert_eq!(dataset.sequence.summary(), "2 timepoints, 2 viewsetups, 1 missing views");
        assert!(!dataset.sequence.is_present(ViewId::new(1, 1)));
        assert_eq!(dataset.view_setup(ViewId::new(0, 1)).unwrap().voxel_size.unit, "pixel");
        assert_eq!(dataset.interest_points.labels(ViewId::new(1, 0)), vec!["beads", "nuclei"]);
    }

    #[test]
    fn test_channels_and_views() {
        let dataset = SpimDataset::from_json_str(SMALL_DATASET).unwrap();
        let views = vec![ViewId::new(0, 1), ViewId::new(1, 0), ViewId::new(0, 0)];
        let channels: Vec<String> =
            dataset.channels_of(&views).into_iter().map(|c| c.name).collect();
        assert_eq!(channels, vec!["488", "561"]);
        assert_eq!(dataset.views_of_channel(&views, 0), vec![ViewId::new(1, 0), ViewId::new(0, 0)]);
    }

    #[test]
    fn test_registration_counts() {
        let dataset = SpimDataset::from_json_str(SMALL_DATASET).unwrap();
        let all = vec![ViewId::new(0, 0), ViewId::new(1, 0), ViewId::new(0, 1)];
        assert_eq!(dataset.max_registration_count(&all), 2);
        assert!(dataset.has_more_than_one_registration(&all));
        assert!(!dataset.has_more_than_one_registration(&[ViewId::new(1, 0)]));
        assert_eq!(dataset.max_registration_count(&[]), 0);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let text = SMALL_DATASET.replace(
            r#"{"id": 1, "name": "561"}"#,
            r#"{"id": 0, "name": "561"}"#,
        );
        let err = SpimDataset::from_json_str(&text).unwrap_err();
        assert!(matches!(err, DatasetError::Invalid(_)));
    }

    #[test]
    fn test_rejects_points_of_unknown_view() {
        let text = SMALL_DATASET.replace(
            r#"{"view": {"time_point": 0, "view_setup": 1}"#,
            r#"{"view": {"time_point": 7, "view_setup": 1}"#,
        );
        let err = SpimDataset::from_json_str(&text).unwrap_err();
        assert!(matches!(err, DatasetError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = SpimDataset::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
    }
}
