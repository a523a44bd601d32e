//! Integer range patterns such as `"1,3,5-8"` or `"0-20:5"`.
//!
//! A pattern is a comma separated list of tokens. Each token is either a
//! single non-negative integer, an inclusive range `a-b`, or a stepped range
//! `a-b:s` selecting `a, a+s, ...` up to `b`. The parsed values are returned
//! ascending and without duplicates, so token order and repetition do not
//! matter.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

use crate::error::{Result, SpimError};
use crate::model::entity::{Dimension, Entity};

/// Upper bound on the number of values a single pattern may expand to.
pub const MAX_PATTERN_VALUES: usize = 1_000_000;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"^(\d+)(?:\s*-\s*(\d+)(?:\s*:\s*(\d+))?)?$").expect("token regex is valid")
    })
}

fn parse_number(digits: &str) -> std::result::Result<i64, String> {
    digits
        .parse::<i64>()
        .map_err(|_| format!("number '{}' is out of range", digits))
}

/// Expand a single token into `values`.
fn expand_token(token: &str, values: &mut BTreeSet<i64>) -> std::result::Result<(), String> {
    let captures = token_regex()
        .captures(token)
        .ok_or_else(|| format!("invalid token '{}'", token))?;

    let start = parse_number(&captures[1])?;

    let end = match captures.get(2) {
        Some(m) => parse_number(m.as_str())?,
        None => {
            values.insert(start);
            return Ok(());
        }
    };

    let step = match captures.get(3) {
        Some(m) => parse_number(m.as_str())?,
        None => 1,
    };

    if end < start {
        return Err(format!("range '{}' is descending", token));
    }
    if step < 1 {
        return Err(format!("step in '{}' must be positive", token));
    }
    if ((end - start) / step) as usize >= MAX_PATTERN_VALUES {
        return Err(format!("range '{}' expands to too many values", token));
    }

    let mut value = start;
    loop {
        values.insert(value);
        match value.checked_add(step) {
            Some(next) if next <= end => value = next,
            _ => break,
        }
    }

    Ok(())
}

/// Parse a pattern into ascending, duplicate-free integers.
///
/// The error string describes the first offending token.
pub fn parse_integer_pattern(pattern: &str) -> std::result::Result<Vec<i64>, String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err("pattern is empty".to_string());
    }

    let mut values = BTreeSet::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err("empty entry between commas".to_string());
        }
        expand_token(token, &mut values)?;
        if values.len() > MAX_PATTERN_VALUES {
            return Err("pattern expands to too many values".to_string());
        }
    }

    Ok(values.into_iter().collect())
}

/// Parse a pattern entered for `dimension`, keeping the raw string on failure.
pub fn parse_dimension_pattern(dimension: Dimension, pattern: &str) -> Result<Vec<i64>> {
    parse_integer_pattern(pattern).map_err(|reason| SpimError::PatternParse {
        dimension,
        pattern: pattern.to_string(),
        reason,
    })
}

/// Pattern pre-filled for a fresh range query: the first (up to) three names.
pub fn default_range_pattern(entities: &[Entity]) -> String {
    entities.iter().take(3).map(|e| e.name.as_str()).join(",")
}
