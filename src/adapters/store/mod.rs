//! Storage abstraction traits
//!
//! This module defines the trait the load pipeline writes through. The
//! backing store exposes get-by-primary-key lookups per dimension (returning
//! `Ok(false)` / `Ok(None)` for the distinguishable not-found condition), one
//! batched-insert operation per record type, and a raw bulk-delete escape
//! hatch used only by the reset command.

use crate::domain::records::{
    Action, AdType, Audience, Campaign, DateDim, Impression, Source, Spend, Stat,
};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Backing store for campaign metric records
///
/// Implementations must guarantee that a batched insert either writes the
/// whole batch or surfaces an error; the pipeline performs no retries and
/// never rolls back batches already written by earlier flush steps.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Whether a campaign with this primary key is already persisted
    async fn campaign_exists(&self, id: &Uuid) -> Result<bool>;

    /// Whether an audience with this primary key is already persisted
    async fn audience_exists(&self, id: &str) -> Result<bool>;

    /// Whether an ad type with this primary key is already persisted
    async fn ad_type_exists(&self, id: &str) -> Result<bool>;

    /// Whether a date with this primary key is already persisted
    async fn date_exists(&self, id: &NaiveDate) -> Result<bool>;

    /// Whether a source with this primary key is already persisted
    async fn source_exists(&self, id: &str) -> Result<bool>;

    /// Whether an action with this primary key is already persisted
    async fn action_exists(&self, id: &str) -> Result<bool>;

    /// Whether a spend with this primary key is already persisted
    async fn spend_exists(&self, id: &str) -> Result<bool>;

    /// Looks up the persisted audience belonging to a campaign
    ///
    /// Secondary lookup path used when a row carries no raw audience string
    /// (spend processing). Returns `Ok(None)` when the campaign has no
    /// persisted audience.
    async fn audience_for_campaign(&self, campaign_id: &Uuid) -> Result<Option<Audience>>;

    /// Inserts a batch of campaigns in one statement
    async fn insert_campaigns(&self, batch: Vec<Campaign>) -> Result<u64>;

    /// Inserts a batch of audiences in one statement
    async fn insert_audiences(&self, batch: Vec<Audience>) -> Result<u64>;

    /// Inserts a batch of ad types in one statement
    async fn insert_ad_types(&self, batch: Vec<AdType>) -> Result<u64>;

    /// Inserts a batch of dates in one statement
    async fn insert_dates(&self, batch: Vec<DateDim>) -> Result<u64>;

    /// Inserts a batch of sources in one statement
    async fn insert_sources(&self, batch: Vec<Source>) -> Result<u64>;

    /// Inserts a batch of actions in one statement
    async fn insert_actions(&self, batch: Vec<Action>) -> Result<u64>;

    /// Inserts a batch of impressions in one statement
    async fn insert_impressions(&self, batch: Vec<Impression>) -> Result<u64>;

    /// Inserts a batch of spends in one statement
    async fn insert_spends(&self, batch: Vec<Spend>) -> Result<u64>;

    /// Inserts a batch of stats in one statement
    async fn insert_stats(&self, batch: Vec<Stat>) -> Result<u64>;

    /// Deletes every row from every table, facts before dimensions
    ///
    /// Raw bulk delete used by the reset command before re-loading.
    async fn delete_all_rows(&self) -> Result<u64>;
}
