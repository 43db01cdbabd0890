//! Typed parsing of the embedded `actions` JSON
//!
//! Stats rows carry an `actions` field holding a JSON array of objects, each
//! shaped as `{"action": <name>, <source1>: <count1>, <source2>: <count2>}`.
//! This module parses that encoding once per row into an ordered sequence of
//! breakdowns before any record construction happens, so a malformed shape
//! fails with a defined error instead of partway through fan-out.

use crate::domain::{LoadError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One element of the `actions` array: an action name plus the per-source
/// measurement counts reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionBreakdown {
    /// Action name (e.g. `clicks`, `views`)
    pub action: String,

    /// Remaining key/value pairs: source code to reported count
    #[serde(flatten)]
    pub measurements: BTreeMap<String, i32>,
}

/// Parses a raw `actions` field into breakdowns
///
/// An empty array is valid and yields an empty sequence (the row then fans
/// out to zero stat records).
///
/// # Errors
///
/// Returns `LoadError::Parse` if the field is not valid JSON, is not an
/// array, an element lacks an `action` name, or a measurement is not an
/// integer count.
pub fn parse_actions(raw: &str) -> Result<Vec<ActionBreakdown>> {
    serde_json::from_str(raw)
        .map_err(|e| LoadError::Parse(format!("invalid actions field `{raw}`: {e}")))
}
