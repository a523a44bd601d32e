//! Error types for selection and interest point analysis.

use thiserror::Error;

use crate::model::entity::Dimension;

/// Failures raised by the selection resolver and the histogram engine.
///
/// Expected "nothing selected yet" states are not errors; only malformed
/// input and empty final results end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpimError {
    /// A range pattern could not be parsed. Carries the raw pattern.
    #[error("cannot parse {dimension} pattern '{pattern}': {reason}")]
    PatternParse {
        dimension: Dimension,
        pattern: String,
        reason: String,
    },

    /// The request was well formed but selects nothing. `dimension` is
    /// `None` when every dimension selected something but no present view
    /// is left after combining them. `pattern` holds the raw range pattern
    /// when none of its names matched.
    #[error("{}", empty_selection_message(.dimension, .pattern))]
    EmptySelection {
        dimension: Option<Dimension>,
        pattern: Option<String>,
    },

    /// A numeric parameter is outside of its domain.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SpimError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        SpimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl SpimError {
    pub fn empty(dimension: Dimension) -> Self {
        SpimError::EmptySelection {
            dimension: Some(dimension),
            pattern: None,
        }
    }

    pub fn no_present_view() -> Self {
        SpimError::EmptySelection {
            dimension: None,
            pattern: None,
        }
    }
}

fn empty_selection_message(dimension: &Option<Dimension>, pattern: &Option<String>) -> String {
    match (dimension, pattern) {
        (Some(d), Some(p)) => format!("list of {}s is empty, no name in '{}' matched", d, p),
        (Some(d), None) => format!("list of {}s is empty", d),
        (None, _) => "no present view matches the selection".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SpimError>;
