use serde::{Deserialize, Serialize};

use crate::error::{Result, SpimError};
use crate::model::entity::Dimension;

/// What the user asked for along one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionSpec {
    /// Every entity, in list order.
    #[default]
    All,
    /// Exactly one entity, by list position.
    Single(usize),
    /// Entities at the positions flagged `true`.
    ExplicitSubset(Vec<bool>),
    /// Entities whose names match a range pattern such as `"1,3,5-8"`.
    RangePattern(String),
}

impl SelectionSpec {
    /// Flag vector of length `len` with the given positions set.
    ///
    /// A position beyond the `len` entities of `dimension` is an error.
    pub fn subset_of(dimension: Dimension, len: usize, positions: &[usize]) -> Result<Self> {
        let mut flags = vec![false; len];
        for &p in positions {
            if p >= len {
                return Err(SpimError::invalid_parameter(
                    "positions",
                    format!("{} position {} is out of range (0..{})", dimension, p, len),
                ));
            }
            flags[p] = true;
        }
        Ok(SelectionSpec::ExplicitSubset(flags))
    }

    /// Short name of the selection mode, as used in log output.
    pub fn mode_name(&self) -> &str {
        match self {
            SelectionSpec::All => "all",
            SelectionSpec::Single(_) => "single",
            SelectionSpec::ExplicitSubset(_) => "subset",
            SelectionSpec::RangePattern(_) => "range",
        }
    }
}

/// One selection per dimension. Dimensions not mentioned select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSpecs {
    #[serde(default)]
    pub time_points: SelectionSpec,
    #[serde(default)]
    pub channels: SelectionSpec,
    #[serde(default)]
    pub angles: SelectionSpec,
    #[serde(default)]
    pub illuminations: SelectionSpec,
    #[serde(default)]
    pub view_setups: SelectionSpec,
}

impl SelectionSpecs {
    pub fn all() -> Self {
        SelectionSpecs::default()
    }

    pub fn get(&self, dimension: Dimension) -> &SelectionSpec {
        match dimension {
            Dimension::TimePoint => &self.time_points,
            Dimension::Channel => &self.channels,
            Dimension::Angle => &self.angles,
            Dimension::Illumination => &self.illuminations,
            Dimension::ViewSetup => &self.view_setups,
        }
    }

    pub fn with(mut self, dimension: Dimension, spec: SelectionSpec) -> Self {
        match dimension {
            Dimension::TimePoint => self.time_points = spec,
            Dimension::Channel => self.channels = spec,
            Dimension::Angle => self.angles = spec,
            Dimension::Illumination => self.illuminations = spec,
            Dimension::ViewSetup => self.view_setups = spec,
        }
        self
    }
}
