//! Command-line selection arguments and their mapping to selection specs.

use std::str::FromStr;

use clap::Args;

use spimcore::error::Result;
use spimcore::model::entity::Dimension;
use spimcore::model::sequence::SequenceDescription;
use spimcore::selection::pattern::default_range_pattern;
use spimcore::selection::spec::{SelectionSpec, SelectionSpecs};

/// Selection along one dimension as typed on the command line.
///
/// * `all`
/// * `single:<position>`
/// * `subset:<position>,<position>,...`
/// * anything else is a range pattern over names, e.g. `1,3,5-8`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionArg {
    All,
    Single(usize),
    Subset(Vec<usize>),
    Range(String),
}

impl FromStr for SelectionArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(SelectionArg::All);
        }
        if let Some(rest) = s.strip_prefix("single:") {
            return rest
                .trim()
                .parse::<usize>()
                .map(SelectionArg::Single)
                .map_err(|_| format!("invalid position '{}'", rest));
        }
        if let Some(rest) = s.strip_prefix("subset:") {
            let positions = rest
                .split(',')
                .filter(|p| !p.trim().is_empty())
                .map(|p| {
                    p.trim()
                        .parse::<usize>()
                        .map_err(|_| format!("invalid position '{}'", p))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(SelectionArg::Subset(positions));
        }
        if let Some(rest) = s.strip_prefix("range:") {
            return Ok(SelectionArg::Range(rest.to_string()));
        }
        Ok(SelectionArg::Range(s.to_string()))
    }
}

impl SelectionArg {
    /// Selection spec for `dimension` with `len` entities.
    pub fn to_spec(&self, dimension: Dimension, len: usize) -> Result<SelectionSpec> {
        let spec = match self {
            SelectionArg::All => SelectionSpec::All,
            SelectionArg::Single(position) => SelectionSpec::Single(*position),
            SelectionArg::Subset(positions) => SelectionSpec::subset_of(dimension, len, positions)?,
            SelectionArg::Range(pattern) => SelectionSpec::RangePattern(pattern.clone()),
        };
        Ok(spec)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Time points: all, single:<pos>, subset:<pos,...> or a name pattern like 1-10
    #[arg(long, default_value = "all")]
    pub timepoints: SelectionArg,

    /// Channels, same forms as --timepoints
    #[arg(long, default_value = "all")]
    pub channels: SelectionArg,

    /// Angles, same forms as --timepoints
    #[arg(long, default_value = "all")]
    pub angles: SelectionArg,

    /// Illuminations, same forms as --timepoints
    #[arg(long, default_value = "all")]
    pub illuminations: SelectionArg,

    /// View setups, same forms as --timepoints
    #[arg(long, default_value = "all")]
    pub setups: SelectionArg,
}

impl SelectionArgs {
    pub fn to_specs(&self, sequence: &SequenceDescription) -> Result<SelectionSpecs> {
        let spec = |dimension: Dimension, arg: &SelectionArg| {
            arg.to_spec(dimension, sequence.entities(dimension).len())
        };

        Ok(SelectionSpecs {
            time_points: spec(Dimension::TimePoint, &self.timepoints)?,
            channels: spec(Dimension::Channel, &self.channels)?,
            angles: spec(Dimension::Angle, &self.angles)?,
            illuminations: spec(Dimension::Illumination, &self.illuminations)?,
            view_setups: spec(Dimension::ViewSetup, &self.setups)?,
        })
    }
}

/// Command-line flag selecting along `dimension`.
pub fn flag_name(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::TimePoint => "--timepoints",
        Dimension::Channel => "--channels",
        Dimension::Angle => "--angles",
        Dimension::Illumination => "--illuminations",
        Dimension::ViewSetup => "--setups",
    }
}

/// Example range pattern per flag, built from the first names.
pub fn suggested_patterns(sequence: &SequenceDescription) -> Vec<(&'static str, String)> {
    Dimension::ALL
        .iter()
        .map(|&dimension| {
            let pattern = default_range_pattern(&sequence.entities(dimension));
            (flag_name(dimension), pattern)
        })
        .collect()
}
