//! Fact loaders
//!
//! Impressions and stats are append-only: every row produces records
//! unconditionally. Spend is the one keyed fact, deduplicated by its
//! synthesized composite key so that several stats rows for the same
//! (campaign, ad type, date) share a single spend record.

use crate::adapters::store::MetricStore;
use crate::core::load::loader::{AppendCache, KeyedCache, LoaderKind, RecordKey, RecordLoader};
use crate::core::load::resolver::LoaderSet;
use crate::core::load::row::InputRow;
use crate::domain::records::{Impression, Spend, Stat};
use crate::domain::{parse_actions, LoadError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Impression loader: append-only fact rows, duplicates accumulate
pub struct ImpressionLoader {
    pending: AppendCache<Impression>,
}

impl ImpressionLoader {
    pub fn new() -> Self {
        Self {
            pending: AppendCache::new(),
        }
    }
}

#[async_trait]
impl RecordLoader for ImpressionLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Impression
    }

    async fn cache_row(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let campaign_id = ctx
            .cache_row(LoaderKind::Campaign, store, row)
            .await?
            .into_campaign()?;
        let audience_id = ctx
            .cache_row(LoaderKind::Audience, store, row)
            .await?
            .into_audience()?;
        let impressions = parse_count(row.impressions()?, "impressions")?;

        self.pending.push(Impression {
            campaign_id,
            audience_id,
            impressions,
        });
        Ok(RecordKey::Fact)
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new impressions");
        store.insert_impressions(batch).await
    }
}

/// Spend loader
///
/// Keyed by `{campaign_id}_{ad_type}_{date}` synthesized from the raw row
/// fields. Campaign ids are uuids and dates are ISO formatted, so the
/// separator cannot appear ambiguously inside those components; ad type
/// names containing `_` are a documented constraint on input data.
pub struct SpendLoader {
    pending: KeyedCache<String, Spend>,
}

impl SpendLoader {
    pub fn new() -> Self {
        Self {
            pending: KeyedCache::new(LoaderKind::Spend),
        }
    }

    fn derive_key(row: &InputRow) -> Result<String> {
        let campaign_id = row.campaign_id().ok_or_else(|| {
            LoadError::Parse("missing required field `campaign_id`".to_string())
        })?;
        Ok(format!(
            "{}_{}_{}",
            campaign_id,
            row.ad_type()?,
            row.date()?
        ))
    }
}

#[async_trait]
impl RecordLoader for SpendLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Spend
    }

    async fn cache_row(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let key = Self::derive_key(row)?;
        if store.spend_exists(&key).await? {
            tracing::debug!(spend = %key, "Spend exists");
            return Ok(RecordKey::Spend(key));
        }

        let campaign_id = ctx
            .cache_row(LoaderKind::Campaign, store, row)
            .await?
            .into_campaign()?;
        let audience_id = ctx
            .cache_row(LoaderKind::Audience, store, row)
            .await?
            .into_audience()?;
        let ad_type_id = ctx
            .cache_row(LoaderKind::AdType, store, row)
            .await?
            .into_ad_type()?;
        let date_id = ctx
            .cache_row(LoaderKind::Date, store, row)
            .await?
            .into_date()?;

        let raw_spend = row.spend()?;
        let spend = Decimal::from_str(raw_spend)
            .map_err(|e| LoadError::Parse(format!("invalid spend `{raw_spend}`: {e}")))?;

        self.pending.admit(
            key.clone(),
            Spend {
                id: key.clone(),
                campaign_id,
                audience_id,
                ad_type_id,
                date_id,
                spend,
            },
        );
        Ok(RecordKey::Spend(key))
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new spends");
        store.insert_spends(batch).await
    }
}

/// Stat loader
///
/// Append-only. One input row fans out to one stat record per
/// (source, action) measurement in its actions JSON; the spend, campaign,
/// audience, ad type, and date references are resolved once and shared by
/// every record the row produces. An empty actions array yields no records.
pub struct StatLoader {
    pending: AppendCache<Stat>,
}

impl StatLoader {
    pub fn new() -> Self {
        Self {
            pending: AppendCache::new(),
        }
    }
}

#[async_trait]
impl RecordLoader for StatLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Stat
    }

    async fn cache_row(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        let campaign_id = ctx
            .cache_row(LoaderKind::Campaign, store, row)
            .await?
            .into_campaign()?;
        let audience_id = ctx
            .cache_row(LoaderKind::Audience, store, row)
            .await?
            .into_audience()?;
        let ad_type_id = ctx
            .cache_row(LoaderKind::AdType, store, row)
            .await?
            .into_ad_type()?;
        let spend_id = ctx
            .cache_row(LoaderKind::Spend, store, row)
            .await?
            .into_spend()?;
        let date_id = ctx
            .cache_row(LoaderKind::Date, store, row)
            .await?
            .into_date()?;

        let breakdowns = parse_actions(row.actions()?)?;

        let mut fanned = Vec::new();
        for breakdown in &breakdowns {
            let action_id = ctx
                .cache_row(LoaderKind::Action, store, &InputRow::for_action(&breakdown.action))
                .await?
                .into_action()?;

            for (source, count) in &breakdown.measurements {
                let source_id = ctx
                    .cache_row(LoaderKind::Source, store, &InputRow::for_source(source))
                    .await?
                    .into_source()?;

                fanned.push(Stat {
                    spend_id: spend_id.clone(),
                    campaign_id,
                    audience_id: audience_id.clone(),
                    ad_type_id: ad_type_id.clone(),
                    date_id,
                    source_id,
                    action_id: action_id.clone(),
                    count: *count,
                });
            }
        }

        self.pending.extend(fanned);
        Ok(RecordKey::Fact)
    }

    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64> {
        let batch = self.pending.drain();
        if batch.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = batch.len(), "Saving new stats");
        store.insert_stats(batch).await
    }
}

fn parse_count(raw: &str, field: &str) -> Result<i32> {
    raw.parse()
        .map_err(|e| LoadError::Parse(format!("invalid {field} `{raw}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_key_synthesis() {
        let row = InputRow {
            campaign_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
            ad_type: Some("video".to_string()),
            date: Some("2017-05-22".to_string()),
            ..InputRow::default()
        };
        let key = SpendLoader::derive_key(&row).unwrap();
        assert_eq!(key, "11111111-1111-1111-1111-111111111111_video_2017-05-22");
    }

    #[test]
    fn test_spend_key_requires_every_component() {
        let row = InputRow {
            campaign_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
            ad_type: Some("video".to_string()),
            ..InputRow::default()
        };
        let err = SpendLoader::derive_key(&row).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        let err = parse_count("1.5", "impressions").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.to_string().contains("impressions"));
    }
}
