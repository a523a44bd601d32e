use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::entity::{Dimension, Entity};
use crate::model::view::{ViewDescription, ViewId, ViewSetup};

/// Read-only description of a multi-view acquisition.
///
/// Entity lists are kept in their natural (source) order, which is the order
/// every selection is reported in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceDescription {
    pub time_points: Vec<Entity>,
    pub channels: Vec<Entity>,
    pub angles: Vec<Entity>,
    pub illuminations: Vec<Entity>,
    pub view_setups: Vec<ViewSetup>,
    #[serde(default)]
    pub missing_views: Vec<ViewId>,
    #[serde(skip)]
    missing_lookup: Option<HashSet<ViewId>>,
}

impl SequenceDescription {
    pub fn new(
        time_points: Vec<Entity>,
        channels: Vec<Entity>,
        angles: Vec<Entity>,
        illuminations: Vec<Entity>,
        view_setups: Vec<ViewSetup>,
        missing_views: Vec<ViewId>,
    ) -> Self {
        let missing_lookup = Some(missing_views.iter().copied().collect());
        SequenceDescription {
            time_points,
            channels,
            angles,
            illuminations,
            view_setups,
            missing_views,
            missing_lookup,
        }
    }

    /// Rebuild the presence lookup, needed after deserialization.
    pub fn index(mut self) -> Self {
        self.missing_lookup = Some(self.missing_views.iter().copied().collect());
        self
    }

    /// Ordered entities along one dimension.
    pub fn entities(&self, dimension: Dimension) -> Vec<Entity> {
        match dimension {
            Dimension::TimePoint => self.time_points.clone(),
            Dimension::Channel => self.channels.clone(),
            Dimension::Angle => self.angles.clone(),
            Dimension::Illumination => self.illuminations.clone(),
            Dimension::ViewSetup => self
                .view_setups
                .iter()
                .map(|setup| Entity::new(setup.id, setup.name.clone()))
                .collect(),
        }
    }

    pub fn num_time_points(&self) -> usize {
        self.time_points.len()
    }

    pub fn num_view_setups(&self) -> usize {
        self.view_setups.len()
    }

    pub fn view_setup(&self, id: u32) -> Option<&ViewSetup> {
        self.view_setups.iter().find(|setup| setup.id == id)
    }

    pub fn channel(&self, id: u32) -> Option<&Entity> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn angle(&self, id: u32) -> Option<&Entity> {
        self.angles.iter().find(|a| a.id == id)
    }

    pub fn time_point(&self, id: u32) -> Option<&Entity> {
        self.time_points.iter().find(|t| t.id == id)
    }

    /// A view is present if both its ids are known and it is not listed as missing.
    pub fn is_present(&self, view: ViewId) -> bool {
        if self.time_point(view.time_point).is_none()
            || self.view_setup(view.view_setup).is_none()
        {
            return false;
        }
        match &self.missing_lookup {
            Some(lookup) => !lookup.contains(&view),
            None => !self.missing_views.contains(&view),
        }
    }

    pub fn view_description(&self, view: ViewId) -> Option<ViewDescription> {
        if self.time_point(view.time_point).is_none()
            || self.view_setup(view.view_setup).is_none()
        {
            return None;
        }
        Some(ViewDescription { view_id: view, present: self.is_present(view) })
    }

    /// All views of the dataset in (time point, view setup) source order.
    pub fn view_descriptions(&self) -> Vec<ViewDescription> {
        let mut descriptions = Vec::with_capacity(self.time_points.len() * self.view_setups.len());
        for tp in &self.time_points {
            for setup in &self.view_setups {
                let view_id = ViewId::new(tp.id, setup.id);
                descriptions.push(ViewDescription { view_id, present: self.is_present(view_id) });
            }
        }
        descriptions
    }

    pub fn missing_view_count(&self) -> usize {
        self.view_descriptions().iter().filter(|v| !v.present).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} timepoints, {} viewsetups, {} missing views",
            self.num_time_points(),
            self.num_view_setups(),
            self.missing_view_count()
        )
    }
}
