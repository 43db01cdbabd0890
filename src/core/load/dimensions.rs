//! Dimension loaders
//!
//! Every dimension deduplicates by natural key: a key already persisted is
//! reused (and never re-inserted), a key already pending is reused from the
//! cache, and only genuinely new keys join the batch. The store lookup runs
//! on every call so that records persisted by earlier runs are always
//! detected.

use crate::adapters::store::MetricStore;
use crate::core::load::loader::{KeyedCache, LoaderKind, RecordKey, RecordLoader};
use crate::core::load::resolver::LoaderSet;
use crate::core::load::row::InputRow;
use crate::domain::records::{Action, AdType, Audience, Campaign, DateDim, Source};
use crate::domain::{parse_audience_key, LoadError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Campaign loader: leaf dimension keyed by the campaign identifier
pub struct CampaignLoader {
    pending: KeyedCache<Uuid, Campaign>,
}

impl CampaignLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Campaign),
        }
    }

    /// The identifier comes from the row when present and is generated
    /// otherwise.
    fn derive_key(row: &InputRow) -> Result<Uuid> {
        match row.campaign_id() {
            Some(raw) => Uuid::parse_str(raw)
                .map_err(|e| LoadError::Parse(format!("invalid campaign_id `{raw}`: {e}"))),
            None => Ok(Uuid::new_v4()),
        }
    }
}

#[async_trait]
impl RecordLoader for CampaignLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Campaign
    }

    async fn cache_row(
        &self,
        _ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let id = Self::derive_key(row)?;
        if store.campaign_exists(&id).await? {
            tracing::debug!(campaign = %id, "Campaign exists");
            return Ok(RecordKey::Campaign(id));
        }

        self.pending.admit(id, Campaign { id });
        Ok(RecordKey::Campaign(id))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new campaigns");
        store.insert_campaigns(batch).await
    }
}

/// Audience loader
///
/// Keyed by the raw composite audience string. When a row carries no
/// audience field at all (spend processing), the key resolves through a
/// secondary store lookup by the row's campaign instead of the cache.
pub struct AudienceLoader {
    pending: KeyedCache<String, Audience>,
}

impl AudienceLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Audience),
        }
    }

    async fn resolve_by_campaign(
        &self,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let raw = row.campaign_id().ok_or_else(|| {
            LoadError::Parse("row carries neither an audience key nor a campaign_id".to_string())
        })?;
        let campaign_id = Uuid::parse_str(raw)
            .map_err(|e| LoadError::Parse(format!("invalid campaign_id `{raw}`: {e}")))?;

        let audience = store
            .audience_for_campaign(&campaign_id)
            .await?
            .ok_or_else(|| {
                LoadError::Parse(format!(
                    "row carries no audience key and campaign `{campaign_id}` has no stored audience"
                ))
            })?;
        Ok(RecordKey::Audience(audience.id))
    }
}

#[async_trait]
impl RecordLoader for AudienceLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Audience
    }

    async fn cache_row(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let Some(key) = row.audience() else {
            return self.resolve_by_campaign(store, row).await;
        };

        if store.audience_exists(key).await? {
            tracing::debug!(audience = %key, "Audience exists");
            return Ok(RecordKey::Audience(key.to_string()));
        }

        let campaign_id = ctx
            .cache_row(LoaderKind::Campaign, store, row)
            .await?
            .into_campaign()?;
        let profile = parse_audience_key(key)?;

        self.pending.admit(
            key.to_string(),
            Audience {
                id: key.to_string(),
                campaign_id,
                state: profile.state,
                hair_color: profile.hair_color,
                age_min: profile.age_min,
                age_max: profile.age_max,
            },
        );
        Ok(RecordKey::Audience(key.to_string()))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new audiences");
        store.insert_audiences(batch).await
    }
}

/// Ad type loader: leaf dimension keyed by the literal ad type name
pub struct AdTypeLoader {
    pending: KeyedCache<String, AdType>,
}

impl AdTypeLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::AdType),
        }
    }
}

#[async_trait]
impl RecordLoader for AdTypeLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::AdType
    }

    async fn cache_row(
        &self,
        _ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let key = row.ad_type()?;
        if store.ad_type_exists(key).await? {
            tracing::debug!(ad_type = %key, "Ad type exists");
            return Ok(RecordKey::AdType(key.to_string()));
        }

        self.pending
            .admit(key.to_string(), AdType { id: key.to_string() });
        Ok(RecordKey::AdType(key.to_string()))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new ad types");
        store.insert_ad_types(batch).await
    }
}

/// Date loader: leaf dimension keyed by the calendar date
pub struct DateLoader {
    pending: KeyedCache<NaiveDate, DateDim>,
}

impl DateLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Date),
        }
    }

    fn derive_key(row: &InputRow) -> Result<NaiveDate> {
        let raw = row.date()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| LoadError::Parse(format!("invalid date `{raw}`: {e}")))
    }
}

#[async_trait]
impl RecordLoader for DateLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Date
    }

    async fn cache_row(
        &self,
        _ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let id = Self::derive_key(row)?;
        if store.date_exists(&id).await? {
            tracing::debug!(date = %id, "Date exists");
            return Ok(RecordKey::Date(id));
        }

        self.pending.admit(id, DateDim { id });
        Ok(RecordKey::Date(id))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new dates");
        store.insert_dates(batch).await
    }
}

/// Source loader
///
/// Keyed by the single-character source code. Source values never appear as
/// CSV columns; the stat loader feeds them through synthetic rows while
/// fanning out the actions JSON.
pub struct SourceLoader {
    pending: KeyedCache<String, Source>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Source),
        }
    }
}

#[async_trait]
impl RecordLoader for SourceLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Source
    }

    async fn cache_row(
        &self,
        _ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let key = row.source()?;
        if store.source_exists(key).await? {
            tracing::debug!(source = %key, "Source exists");
            return Ok(RecordKey::Source(key.to_string()));
        }

        self.pending
            .admit(key.to_string(), Source { id: key.to_string() });
        Ok(RecordKey::Source(key.to_string()))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new sources");
        store.insert_sources(batch).await
    }
}

/// Action loader, fed through synthetic rows like [`SourceLoader`]
pub struct ActionLoader {
    pending: KeyedCache<String, Action>,
}

impl ActionLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Action),
        }
    }
}

#[async_trait]
impl RecordLoader for ActionLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Action
    }

    async fn cache_row(
        &self,
        _ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let key = row.action()?;
        if store.action_exists(key).await? {
            tracing::debug!(action = %key, "Action exists");
            return Ok(RecordKey::Action(key.to_string()));
        }

        self.pending
            .admit(key.to_string(), Action { id: key.to_string() });
        Ok(RecordKey::Action(key.to_string()))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new actions");
        store.insert_actions(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_key_from_row() {
        let row = InputRow {
            campaign_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
            ..InputRow::default()
        };
        let id = CampaignLoader::derive_key(&row).unwrap();
        assert_eq!(id.to_string(), "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn test_campaign_key_generated_when_absent() {
        let row = InputRow::default();
        let first = CampaignLoader::derive_key(&row).unwrap();
        let second = CampaignLoader::derive_key(&row).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_campaign_key_invalid_uuid() {
        let row = InputRow {
            campaign_id: Some("not-a-uuid".to_string()),
            ..InputRow::default()
        };
        let err = CampaignLoader::derive_key(&row).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_date_key_requires_iso_format() {
        let row = InputRow {
            date: Some("22/05/2017".to_string()),
            ..InputRow::default()
        };
        let err = DateLoader::derive_key(&row).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_date_key_parses_iso() {
        let row = InputRow {
            date: Some("2017-05-22".to_string()),
            ..InputRow::default()
        };
        let date = DateLoader::derive_key(&row).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2017, 5, 22).unwrap());
    }
}
