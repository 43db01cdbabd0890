//! In-memory store test double
//!
//! Mirrors the backing store's contract closely enough to exercise the load
//! pipeline without a database: duplicate primary keys and missing foreign
//! keys fail the way the real store's constraints would, and every batch
//! insert is recorded in call order so tests can assert on flush ordering.

use adload::adapters::store::MetricStore;
use adload::domain::records::{
    Action, AdType, Audience, Campaign, DateDim, Impression, Source, Spend, Stat,
};
use adload::domain::{LoadError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    pub campaigns: Mutex<HashSet<Uuid>>,
    pub audiences: Mutex<HashMap<String, Audience>>,
    pub ad_types: Mutex<HashSet<String>>,
    pub dates: Mutex<HashSet<NaiveDate>>,
    pub sources: Mutex<HashSet<String>>,
    pub actions: Mutex<HashSet<String>>,
    pub spends: Mutex<HashMap<String, Spend>>,
    pub impressions: Mutex<Vec<Impression>>,
    pub stats: Mutex<Vec<Stat>>,

    /// Table names, one entry per insert/delete call, in call order
    pub calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a campaign, as if persisted by an earlier run
    pub fn seed_campaign(&self, id: Uuid) {
        self.campaigns.lock().unwrap().insert(id);
    }

    /// Pre-populates an audience, as if persisted by an earlier run
    pub fn seed_audience(&self, audience: Audience) {
        self.audiences
            .lock()
            .unwrap()
            .insert(audience.id.clone(), audience);
    }

    pub fn record_call(&self, table: &str) {
        self.calls.lock().unwrap().push(table.to_string());
    }

    /// Call-order position of a table's insert, if it happened
    pub fn call_position(&self, table: &str) -> Option<usize> {
        self.calls.lock().unwrap().iter().position(|t| t == table)
    }

    pub fn call_count(&self, table: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| *t == table)
            .count()
    }

    fn check_campaign_fk(&self, id: &Uuid, table: &str) -> Result<()> {
        if !self.campaigns.lock().unwrap().contains(id) {
            return Err(LoadError::Integrity(format!(
                "{table}: campaign `{id}` not present"
            )));
        }
        Ok(())
    }

    fn check_audience_fk(&self, id: &str, table: &str) -> Result<()> {
        if !self.audiences.lock().unwrap().contains_key(id) {
            return Err(LoadError::Integrity(format!(
                "{table}: audience `{id}` not present"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricStore for MemoryStore {
    async fn campaign_exists(&self, id: &Uuid) -> Result<bool> {
        Ok(self.campaigns.lock().unwrap().contains(id))
    }

    async fn audience_exists(&self, id: &str) -> Result<bool> {
        Ok(self.audiences.lock().unwrap().contains_key(id))
    }

    async fn ad_type_exists(&self, id: &str) -> Result<bool> {
        Ok(self.ad_types.lock().unwrap().contains(id))
    }

    async fn date_exists(&self, id: &NaiveDate) -> Result<bool> {
        Ok(self.dates.lock().unwrap().contains(id))
    }

    async fn source_exists(&self, id: &str) -> Result<bool> {
        Ok(self.sources.lock().unwrap().contains(id))
    }

    async fn action_exists(&self, id: &str) -> Result<bool> {
        Ok(self.actions.lock().unwrap().contains(id))
    }

    async fn spend_exists(&self, id: &str) -> Result<bool> {
        Ok(self.spends.lock().unwrap().contains_key(id))
    }

    async fn audience_for_campaign(&self, campaign_id: &Uuid) -> Result<Option<Audience>> {
        Ok(self
            .audiences
            .lock()
            .unwrap()
            .values()
            .find(|a| a.campaign_id == *campaign_id)
            .cloned())
    }

    async fn insert_campaigns(&self, batch: Vec<Campaign>) -> Result<u64> {
        self.record_call("campaigns");
        let mut campaigns = self.campaigns.lock().unwrap();
        let count = batch.len();
        for campaign in batch {
            if !campaigns.insert(campaign.id) {
                return Err(LoadError::Integrity(format!(
                    "duplicate campaign key `{}`",
                    campaign.id
                )));
            }
        }
        Ok(count as u64)
    }

    async fn insert_audiences(&self, batch: Vec<Audience>) -> Result<u64> {
        self.record_call("audiences");
        let count = batch.len();
        for audience in batch {
            self.check_campaign_fk(&audience.campaign_id, "audiences")?;
            let mut audiences = self.audiences.lock().unwrap();
            if audiences.contains_key(&audience.id) {
                return Err(LoadError::Integrity(format!(
                    "duplicate audience key `{}`",
                    audience.id
                )));
            }
            audiences.insert(audience.id.clone(), audience);
        }
        Ok(count as u64)
    }

    async fn insert_ad_types(&self, batch: Vec<AdType>) -> Result<u64> {
        self.record_call("ad_types");
        let mut ad_types = self.ad_types.lock().unwrap();
        let count = batch.len();
        for ad_type in batch {
            if !ad_types.insert(ad_type.id.clone()) {
                return Err(LoadError::Integrity(format!(
                    "duplicate ad type key `{}`",
                    ad_type.id
                )));
            }
        }
        Ok(count as u64)
    }

    async fn insert_dates(&self, batch: Vec<DateDim>) -> Result<u64> {
        self.record_call("dates");
        let mut dates = self.dates.lock().unwrap();
        let count = batch.len();
        for date in batch {
            if !dates.insert(date.id) {
                return Err(LoadError::Integrity(format!(
                    "duplicate date key `{}`",
                    date.id
                )));
            }
        }
        Ok(count as u64)
    }

    async fn insert_sources(&self, batch: Vec<Source>) -> Result<u64> {
        self.record_call("sources");
        let mut sources = self.sources.lock().unwrap();
        let count = batch.len();
        for source in batch {
            if !sources.insert(source.id.clone()) {
                return Err(LoadError::Integrity(format!(
                    "duplicate source key `{}`",
                    source.id
                )));
            }
        }
        Ok(count as u64)
    }

    async fn insert_actions(&self, batch: Vec<Action>) -> Result<u64> {
        self.record_call("actions");
        let mut actions = self.actions.lock().unwrap();
        let count = batch.len();
        for action in batch {
            if !actions.insert(action.id.clone()) {
                return Err(LoadError::Integrity(format!(
                    "duplicate action key `{}`",
                    action.id
                )));
            }
        }
        Ok(count as u64)
    }

    async fn insert_impressions(&self, batch: Vec<Impression>) -> Result<u64> {
        self.record_call("impressions");
        let count = batch.len();
        for impression in &batch {
            self.check_campaign_fk(&impression.campaign_id, "impressions")?;
            self.check_audience_fk(&impression.audience_id, "impressions")?;
        }
        self.impressions.lock().unwrap().extend(batch);
        Ok(count as u64)
    }

    async fn insert_spends(&self, batch: Vec<Spend>) -> Result<u64> {
        self.record_call("spends");
        let count = batch.len();
        for spend in batch {
            self.check_campaign_fk(&spend.campaign_id, "spends")?;
            self.check_audience_fk(&spend.audience_id, "spends")?;
            if !self.ad_types.lock().unwrap().contains(&spend.ad_type_id) {
                return Err(LoadError::Integrity(format!(
                    "spends: ad type `{}` not present",
                    spend.ad_type_id
                )));
            }
            if !self.dates.lock().unwrap().contains(&spend.date_id) {
                return Err(LoadError::Integrity(format!(
                    "spends: date `{}` not present",
                    spend.date_id
                )));
            }
            let mut spends = self.spends.lock().unwrap();
            if spends.contains_key(&spend.id) {
                return Err(LoadError::Integrity(format!(
                    "duplicate spend key `{}`",
                    spend.id
                )));
            }
            spends.insert(spend.id.clone(), spend);
        }
        Ok(count as u64)
    }

    async fn insert_stats(&self, batch: Vec<Stat>) -> Result<u64> {
        self.record_call("stats");
        let count = batch.len();
        for stat in &batch {
            self.check_campaign_fk(&stat.campaign_id, "stats")?;
            self.check_audience_fk(&stat.audience_id, "stats")?;
            if !self.spends.lock().unwrap().contains_key(&stat.spend_id) {
                return Err(LoadError::Integrity(format!(
                    "stats: spend `{}` not present",
                    stat.spend_id
                )));
            }
            if !self.sources.lock().unwrap().contains(&stat.source_id) {
                return Err(LoadError::Integrity(format!(
                    "stats: source `{}` not present",
                    stat.source_id
                )));
            }
            if !self.actions.lock().unwrap().contains(&stat.action_id) {
                return Err(LoadError::Integrity(format!(
                    "stats: action `{}` not present",
                    stat.action_id
                )));
            }
        }
        self.stats.lock().unwrap().extend(batch);
        Ok(count as u64)
    }

    async fn delete_all_rows(&self) -> Result<u64> {
        self.record_call("delete_all");
        let mut deleted = 0u64;

        deleted += self.stats.lock().unwrap().drain(..).count() as u64;
        deleted += self.impressions.lock().unwrap().drain(..).count() as u64;
        deleted += self.spends.lock().unwrap().drain().count() as u64;
        deleted += self.ad_types.lock().unwrap().drain().count() as u64;
        deleted += self.sources.lock().unwrap().drain().count() as u64;
        deleted += self.actions.lock().unwrap().drain().count() as u64;
        deleted += self.dates.lock().unwrap().drain().count() as u64;
        deleted += self.audiences.lock().unwrap().drain().count() as u64;
        deleted += self.campaigns.lock().unwrap().drain().count() as u64;

        Ok(deleted)
    }
}
