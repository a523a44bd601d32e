use std::collections::BTreeMap;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::model::view::{ViewId, VoxelSize};

/// A detected feature location in voxel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestPoint {
    pub id: u64,
    pub location: [f64; 3],
}

impl InterestPoint {
    pub fn new(id: u64, location: [f64; 3]) -> Self {
        InterestPoint { id, location }
    }
}

/// Interest points of one view stored under a label, e.g. "beads" or "nuclei".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestPointList {
    pub label: String,
    pub points: Vec<InterestPoint>,
}

impl InterestPointList {
    pub fn new(label: impl Into<String>, points: Vec<InterestPoint>) -> Self {
        InterestPointList { label: label.into(), points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points scaled into physical units.
    pub fn to_physical(&self, voxel_size: &VoxelSize) -> Vec<Point3<f64>> {
        scale_points(&self.points, voxel_size)
    }
}

/// Multiply every coordinate by the per-axis voxel size.
pub fn scale_points(points: &[InterestPoint], voxel_size: &VoxelSize) -> Vec<Point3<f64>> {
    points.iter().map(|ip| voxel_size.to_physical(&ip.location)).collect()
}

/// All labelled interest point lists of a dataset, keyed by view.
#[derive(Debug, Clone, Default)]
pub struct ViewInterestPoints {
    lists: BTreeMap<ViewId, BTreeMap<String, InterestPointList>>,
}

impl ViewInterestPoints {
    pub fn new() -> Self {
        ViewInterestPoints { lists: BTreeMap::new() }
    }

    pub fn insert(&mut self, view: ViewId, list: InterestPointList) {
        self.lists.entry(view).or_default().insert(list.label.clone(), list);
    }

    pub fn get(&self, view: ViewId, label: &str) -> Option<&InterestPointList> {
        self.lists.get(&view).and_then(|by_label| by_label.get(label))
    }

    /// Labels stored for a view, sorted.
    pub fn labels(&self, view: ViewId) -> Vec<&str> {
        match self.lists.get(&view) {
            Some(by_label) => by_label.keys().map(|s| s.as_str()).collect(),
            None => Vec::new(),
        }
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewId> {
        self.lists.keys()
    }
}
