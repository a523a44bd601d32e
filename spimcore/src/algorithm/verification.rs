use std::fmt;

use serde::{Deserialize, Serialize};

/// Above this many interest points per view and label a detection is
/// considered over-segmented.
pub const UPPER_THRESHOLD: usize = 20000;

/// Classification of an interest point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountVerdict {
    Reasonable,
    /// nothing was detected
    Zero,
    /// more points than the threshold
    TooMany,
}

impl CountVerdict {
    pub fn is_reasonable(&self) -> bool {
        matches!(self, CountVerdict::Reasonable)
    }
}

impl fmt::Display for CountVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CountVerdict::Reasonable => write!(f, "reasonable"),
            CountVerdict::Zero => write!(f, "interest point count = 0"),
            CountVerdict::TooMany => write!(f, "interest point count > threshold"),
        }
    }
}

pub fn classify_count(count: usize, upper_threshold: usize) -> CountVerdict {
    if count == 0 {
        CountVerdict::Zero
    } else if count > upper_threshold {
        CountVerdict::TooMany
    } else {
        CountVerdict::Reasonable
    }
}

/// True iff `count` is zero or above [`UPPER_THRESHOLD`].
pub fn is_unreasonable_count(count: usize) -> bool {
    !classify_count(count, UPPER_THRESHOLD).is_reasonable()
}
