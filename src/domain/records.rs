//! Record types for the campaign metrics schema
//!
//! Dimension records are deduplicated by their natural key during a load run;
//! fact records reference dimensions and accumulate freely. All records are
//! immutable once written to the backing store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campaign dimension
///
/// Keyed by an opaque unique identifier. The identifier comes from the input
/// row when present and is generated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
}

/// Audience dimension
///
/// Keyed by the raw composite audience string (e.g. `NY_purple_18-25`); the
/// structured attributes are derived by parsing that key against the audience
/// grammar. References the owning campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub campaign_id: Uuid,
    pub state: String,
    pub hair_color: String,
    pub age_min: i16,
    pub age_max: i16,
}

/// Ad type dimension, keyed by the literal ad type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdType {
    pub id: String,
}

/// Source dimension, keyed by the single-character source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
}

/// Action dimension, keyed by the action name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
}

/// Calendar date dimension, keyed by the date itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDim {
    pub id: NaiveDate,
}

/// Impression fact row
///
/// No uniqueness constraint: duplicate (campaign, audience) pairs are valid
/// and accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impression {
    pub campaign_id: Uuid,
    pub audience_id: String,
    pub impressions: i32,
}

/// Spend fact row
///
/// Keyed by the synthesized string `{campaign_id}_{ad_type}_{date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spend {
    pub id: String,
    pub campaign_id: Uuid,
    pub audience_id: String,
    pub ad_type_id: String,
    pub date_id: NaiveDate,
    pub spend: Decimal,
}

/// Stat fact row
///
/// One input row carrying N (source, action)-keyed measurements yields N
/// stat rows, all sharing the spend/campaign/audience/ad-type/date resolved
/// for the whole row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub spend_id: String,
    pub campaign_id: Uuid,
    pub audience_id: String,
    pub ad_type_id: String,
    pub date_id: NaiveDate,
    pub source_id: String,
    pub action_id: String,
    pub count: i32,
}
