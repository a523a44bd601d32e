use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The axes a multi-view dataset is organized along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    TimePoint,
    Channel,
    Angle,
    Illumination,
    ViewSetup,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::TimePoint,
        Dimension::Channel,
        Dimension::Angle,
        Dimension::Illumination,
        Dimension::ViewSetup,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            Dimension::TimePoint => "timepoint",
            Dimension::Channel => "channel",
            Dimension::Angle => "angle",
            Dimension::Illumination => "illumination",
            Dimension::ViewSetup => "viewsetup",
        }
    }

    /// Capitalized plural used in selection summaries, e.g. "Timepoints".
    pub fn plural_title(&self) -> &str {
        match self {
            Dimension::TimePoint => "Timepoints",
            Dimension::Channel => "Channels",
            Dimension::Angle => "Angles",
            Dimension::Illumination => "Illuminations",
            Dimension::ViewSetup => "Viewsetups",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// One value along a dimension: a stable id and a display name.
///
/// Time point names are usually numeric strings, which is what range
/// patterns are matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
}

impl Entity {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Entity { id, name: name.into() }
    }

    /// Entity whose name is the decimal id, the common case for time points.
    pub fn numbered(id: u32) -> Self {
        Entity { id, name: id.to_string() }
    }

    /// True if the name denotes the integer `value`.
    ///
    /// Numeric names are compared as integers so "007" matches 7; other
    /// names never match.
    pub fn name_matches(&self, value: i64) -> bool {
        match self.name.trim().parse::<i64>() {
            Ok(parsed) => parsed == value,
            Err(_) => false,
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
