//! Input row model
//!
//! Rows arrive from the CSV layer with every field optional: the impressions
//! file and the stats file carry different columns, and the stat fan-out
//! feeds source/action values through the same row type. Loaders pull the
//! fields they need and fail with a parse error naming the missing field.

use crate::domain::{LoadError, Result};
use serde::Deserialize;

/// One input row, as read from a CSV record
///
/// Fields absent from the input file deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRow {
    pub(crate) campaign_id: Option<String>,
    pub(crate) audience: Option<String>,
    pub(crate) impressions: Option<String>,
    pub(crate) ad_type: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) spend: Option<String>,
    pub(crate) actions: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) action: Option<String>,
}

impl InputRow {
    /// Builds a synthetic row carrying only a source code
    ///
    /// Used by the stat loader to feed measurement keys from the actions
    /// JSON through the source loader.
    pub fn for_source(code: &str) -> Self {
        Self {
            source: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Builds a synthetic row carrying only an action name
    pub fn for_action(name: &str) -> Self {
        Self {
            action: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Campaign identifier, when the row carries a non-empty one
    pub fn campaign_id(&self) -> Option<&str> {
        optional(&self.campaign_id)
    }

    /// Raw audience key, when the row carries a non-empty one
    pub fn audience(&self) -> Option<&str> {
        optional(&self.audience)
    }

    pub fn impressions(&self) -> Result<&str> {
        required(&self.impressions, "impressions")
    }

    pub fn ad_type(&self) -> Result<&str> {
        required(&self.ad_type, "ad_type")
    }

    pub fn date(&self) -> Result<&str> {
        required(&self.date, "date")
    }

    pub fn spend(&self) -> Result<&str> {
        required(&self.spend, "spend")
    }

    pub fn actions(&self) -> Result<&str> {
        required(&self.actions, "actions")
    }

    pub fn source(&self) -> Result<&str> {
        required(&self.source, "source")
    }

    pub fn action(&self) -> Result<&str> {
        required(&self.action, "action")
    }
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    optional(value).ok_or_else(|| LoadError::Parse(format!("missing required field `{field}`")))
}
