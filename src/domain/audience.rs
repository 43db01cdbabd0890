//! Audience key grammar
//!
//! Audience natural keys are compact composite strings of the form
//! `STATE_color_minage-maxage` (e.g. `NY_purple_18-25`). This module parses
//! them into structured attributes. A key that does not match the grammar is
//! a fatal parse error for the row that carried it; no recovery is attempted.

use crate::domain::{LoadError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Grammar for audience keys: 2-letter state code, lowercase hair color,
/// inclusive age range.
static AUDIENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<state>[A-Z]{2})_(?P<color>[a-z]+)_(?P<min_age>\d+)-(?P<max_age>\d+)$")
        .expect("audience pattern is valid")
});

/// Structured attributes derived from an audience key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceProfile {
    pub state: String,
    pub hair_color: String,
    pub age_min: i16,
    pub age_max: i16,
}

/// Parses an audience key against the grammar
///
/// # Errors
///
/// Returns `LoadError::Parse` if the key does not match the grammar or an
/// age component does not fit a small integer.
pub fn parse_audience_key(key: &str) -> Result<AudienceProfile> {
    let caps = AUDIENCE_PATTERN.captures(key).ok_or_else(|| {
        LoadError::Parse(format!(
            "audience key `{key}` does not match STATE_color_minage-maxage"
        ))
    })?;

    Ok(AudienceProfile {
        state: caps["state"].to_string(),
        hair_color: caps["color"].to_string(),
        age_min: parse_age(key, &caps["min_age"])?,
        age_max: parse_age(key, &caps["max_age"])?,
    })
}

fn parse_age(key: &str, raw: &str) -> Result<i16> {
    raw.parse()
        .map_err(|_| LoadError::Parse(format!("audience key `{key}`: age `{raw}` out of range")))
}
