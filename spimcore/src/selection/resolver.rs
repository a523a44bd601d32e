//! Turns per-dimension selections into the list of views to process.
//!
//! Each dimension is resolved independently into entity ids (kept in the
//! order of the source list), then view setups are narrowed to the selected
//! channels, angles and illuminations, and finally crossed with the selected
//! time points. Views flagged missing in the sequence description are
//! dropped from the result without failing.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::error::{Result, SpimError};
use crate::model::entity::{Dimension, Entity};
use crate::model::sequence::SequenceDescription;
use crate::model::view::ViewId;
use crate::selection::pattern::parse_dimension_pattern;
use crate::selection::spec::{SelectionSpec, SelectionSpecs};

/// A name requested through a range pattern that no entity carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedName {
    pub dimension: Dimension,
    pub name: i64,
}

impl fmt::Display for UnresolvedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} not part of the list of {}. Ignoring it.",
            self.dimension,
            self.name,
            self.dimension.plural_title().to_lowercase()
        )
    }
}

/// Messages produced while resolving, meant to be shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionDiagnostics {
    pub messages: Vec<String>,
    pub unresolved: Vec<UnresolvedName>,
    pub dropped_missing_views: usize,
}

impl SelectionDiagnostics {
    fn note(&mut self, message: String) {
        log::info!("{}", message);
        self.messages.push(message);
    }

    fn unresolved(&mut self, warning: UnresolvedName) {
        log::warn!("{}", warning);
        self.unresolved.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Outcome of a successful resolution. `views` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSelection {
    pub time_points: Vec<u32>,
    pub channels: Vec<u32>,
    pub angles: Vec<u32>,
    pub illuminations: Vec<u32>,
    pub view_setups: Vec<u32>,
    pub views: Vec<ViewId>,
    pub diagnostics: SelectionDiagnostics,
}

impl ResolvedSelection {
    pub fn ids(&self, dimension: Dimension) -> &[u32] {
        match dimension {
            Dimension::TimePoint => &self.time_points,
            Dimension::Channel => &self.channels,
            Dimension::Angle => &self.angles,
            Dimension::Illumination => &self.illuminations,
            Dimension::ViewSetup => &self.view_setups,
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Positions in `entities` requested by a range pattern, in source order.
fn pattern_positions(
    dimension: Dimension,
    entities: &[Entity],
    pattern: &str,
    diagnostics: &mut SelectionDiagnostics,
) -> Result<Vec<usize>> {
    let requested = parse_dimension_pattern(dimension, pattern)?;
    let mut positions = Vec::with_capacity(requested.len());

    for name in requested {
        match entities.iter().position(|e| e.name_matches(name)) {
            Some(position) => positions.push(position),
            None => diagnostics.unresolved(UnresolvedName { dimension, name }),
        }
    }

    positions.sort_unstable();
    positions.dedup();
    Ok(positions)
}

/// Resolve one dimension into entity ids, ordered as in `entities`.
pub fn resolve_dimension(
    dimension: Dimension,
    entities: &[Entity],
    spec: &SelectionSpec,
    diagnostics: &mut SelectionDiagnostics,
) -> Result<Vec<u32>> {
    log::debug!("resolving {} by {} selection", dimension, spec.mode_name());

    let positions: Vec<usize> = match spec {
        SelectionSpec::All => (0..entities.len()).collect(),
        SelectionSpec::Single(index) => {
            if *index >= entities.len() {
                return Err(SpimError::invalid_parameter(
                    "index",
                    format!(
                        "{} index {} is out of range (0..{})",
                        dimension,
                        index,
                        entities.len()
                    ),
                ));
            }
            vec![*index]
        }
        SelectionSpec::ExplicitSubset(flags) => {
            if flags.len() != entities.len() {
                return Err(SpimError::invalid_parameter(
                    "flags",
                    format!("expected {} {} flags, got {}", entities.len(), dimension, flags.len()),
                ));
            }
            flags
                .iter()
                .enumerate()
                .filter(|(_, flag)| **flag)
                .map(|(i, _)| i)
                .collect()
        }
        SelectionSpec::RangePattern(pattern) => {
            pattern_positions(dimension, entities, pattern, diagnostics)?
        }
    };

    if positions.is_empty() {
        let pattern = match spec {
            SelectionSpec::RangePattern(pattern) => Some(pattern.clone()),
            _ => None,
        };
        return Err(SpimError::EmptySelection {
            dimension: Some(dimension),
            pattern,
        });
    }

    diagnostics.note(format!(
        "{} selected: {}",
        dimension.plural_title(),
        positions.iter().map(|&p| entities[p].name.as_str()).join(",")
    ));

    Ok(positions.into_iter().map(|p| entities[p].id).collect())
}

/// Resolve all five dimensions and combine them into present views.
///
/// The result is ordered by time point, then view setup, each in source
/// order of the sequence description.
pub fn resolve(
    sequence: &SequenceDescription,
    specs: &SelectionSpecs,
) -> Result<ResolvedSelection> {
    let mut diagnostics = SelectionDiagnostics::default();

    let mut select = |dimension: Dimension| {
        let entities = sequence.entities(dimension);
        resolve_dimension(dimension, &entities, specs.get(dimension), &mut diagnostics)
    };

    let time_points = select(Dimension::TimePoint)?;
    let channels = select(Dimension::Channel)?;
    let angles = select(Dimension::Angle)?;
    let illuminations = select(Dimension::Illumination)?;
    let view_setups_requested = select(Dimension::ViewSetup)?;

    // setups must agree with the channel, angle and illumination selections
    let view_setups: Vec<u32> = sequence
        .view_setups
        .iter()
        .filter(|setup| {
            view_setups_requested.contains(&setup.id)
                && channels.contains(&setup.channel)
                && angles.contains(&setup.angle)
                && illuminations.contains(&setup.illumination)
        })
        .map(|setup| setup.id)
        .collect();

    let mut views = Vec::with_capacity(time_points.len() * view_setups.len());
    for (&tp, &setup) in time_points.iter().cartesian_product(view_setups.iter()) {
        let view = ViewId::new(tp, setup);
        if sequence.is_present(view) {
            views.push(view);
        } else {
            diagnostics.dropped_missing_views += 1;
        }
    }

    if diagnostics.dropped_missing_views > 0 {
        log::info!("Ignoring {} missing views", diagnostics.dropped_missing_views);
    }

    if views.is_empty() {
        return Err(SpimError::no_present_view());
    }

    diagnostics.note(format!(
        "Views selected: {} ({} missing views ignored)",
        views.len(),
        diagnostics.dropped_missing_views
    ));

    Ok(ResolvedSelection {
        time_points,
        channels,
        angles,
        illuminations,
        view_setups,
        views,
        diagnostics,
    })
}
