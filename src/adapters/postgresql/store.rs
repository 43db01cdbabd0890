//! PostgreSQL implementation of the storage abstraction
//!
//! Batch inserts are issued as single multi-row `INSERT ... SELECT FROM
//! UNNEST(...)` statements, one statement per loader batch, instead of
//! row-by-row writes. In dry-run mode every write is skipped and reported
//! as if it succeeded.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::store::MetricStore;
use crate::domain::records::{
    Action, AdType, Audience, Campaign, DateDim, Impression, Source, Spend, Stat,
};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// PostgreSQL-backed metric store
pub struct PostgresStore {
    client: Arc<PostgreSQLClient>,
    dry_run: bool,
}

impl PostgresStore {
    /// Create a new store over an existing client
    pub fn new(client: Arc<PostgreSQLClient>, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn exists(
        &self,
        query: &str,
        key: &(dyn tokio_postgres::types::ToSql + Sync),
    ) -> Result<bool> {
        Ok(self.client.query_opt(query, &[key]).await?.is_some())
    }

    fn skip_write(&self, table: &str, count: usize) -> u64 {
        tracing::info!(table, count, "DRY RUN: Would insert rows");
        count as u64
    }
}

#[async_trait]
impl MetricStore for PostgresStore {
    async fn campaign_exists(&self, id: &Uuid) -> Result<bool> {
        self.exists("SELECT 1 FROM campaigns WHERE id = $1", id).await
    }

    async fn audience_exists(&self, id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM audiences WHERE id = $1", &id).await
    }

    async fn ad_type_exists(&self, id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM ad_types WHERE id = $1", &id).await
    }

    async fn date_exists(&self, id: &NaiveDate) -> Result<bool> {
        self.exists("SELECT 1 FROM dates WHERE id = $1", id).await
    }

    async fn source_exists(&self, id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM sources WHERE id = $1", &id).await
    }

    async fn action_exists(&self, id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM actions WHERE id = $1", &id).await
    }

    async fn spend_exists(&self, id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM spends WHERE id = $1", &id).await
    }

    async fn audience_for_campaign(&self, campaign_id: &Uuid) -> Result<Option<Audience>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, campaign_id, state, hair_color, age_min, age_max \
                 FROM audiences WHERE campaign_id = $1 LIMIT 1",
                &[campaign_id],
            )
            .await?;

        Ok(row.map(|row| Audience {
            id: row.get(0),
            campaign_id: row.get(1),
            state: row.get(2),
            hair_color: row.get(3),
            age_min: row.get(4),
            age_max: row.get(5),
        }))
    }

    async fn insert_campaigns(&self, batch: Vec<Campaign>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("campaigns", batch.len()));
        }

        let ids: Vec<Uuid> = batch.iter().map(|c| c.id).collect();
        self.client
            .execute(
                "INSERT INTO campaigns (id) SELECT * FROM UNNEST($1::uuid[])",
                &[&ids],
            )
            .await
    }

    async fn insert_audiences(&self, batch: Vec<Audience>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("audiences", batch.len()));
        }

        let ids: Vec<&str> = batch.iter().map(|a| a.id.as_str()).collect();
        let campaign_ids: Vec<Uuid> = batch.iter().map(|a| a.campaign_id).collect();
        let states: Vec<&str> = batch.iter().map(|a| a.state.as_str()).collect();
        let hair_colors: Vec<&str> = batch.iter().map(|a| a.hair_color.as_str()).collect();
        let age_mins: Vec<i16> = batch.iter().map(|a| a.age_min).collect();
        let age_maxes: Vec<i16> = batch.iter().map(|a| a.age_max).collect();

        self.client
            .execute(
                "INSERT INTO audiences (id, campaign_id, state, hair_color, age_min, age_max) \
                 SELECT * FROM UNNEST($1::text[], $2::uuid[], $3::text[], $4::text[], \
                 $5::int2[], $6::int2[])",
                &[
                    &ids,
                    &campaign_ids,
                    &states,
                    &hair_colors,
                    &age_mins,
                    &age_maxes,
                ],
            )
            .await
    }

    async fn insert_ad_types(&self, batch: Vec<AdType>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("ad_types", batch.len()));
        }

        let ids: Vec<&str> = batch.iter().map(|a| a.id.as_str()).collect();
        self.client
            .execute(
                "INSERT INTO ad_types (id) SELECT * FROM UNNEST($1::text[])",
                &[&ids],
            )
            .await
    }

    async fn insert_dates(&self, batch: Vec<DateDim>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("dates", batch.len()));
        }

        let ids: Vec<NaiveDate> = batch.iter().map(|d| d.id).collect();
        self.client
            .execute(
                "INSERT INTO dates (id) SELECT * FROM UNNEST($1::date[])",
                &[&ids],
            )
            .await
    }

    async fn insert_sources(&self, batch: Vec<Source>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("sources", batch.len()));
        }

        let ids: Vec<&str> = batch.iter().map(|s| s.id.as_str()).collect();
        self.client
            .execute(
                "INSERT INTO sources (id) SELECT * FROM UNNEST($1::text[])",
                &[&ids],
            )
            .await
    }

    async fn insert_actions(&self, batch: Vec<Action>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("actions", batch.len()));
        }

        let ids: Vec<&str> = batch.iter().map(|a| a.id.as_str()).collect();
        self.client
            .execute(
                "INSERT INTO actions (id) SELECT * FROM UNNEST($1::text[])",
                &[&ids],
            )
            .await
    }

    async fn insert_impressions(&self, batch: Vec<Impression>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("impressions", batch.len()));
        }

        let campaign_ids: Vec<Uuid> = batch.iter().map(|i| i.campaign_id).collect();
        let audience_ids: Vec<&str> = batch.iter().map(|i| i.audience_id.as_str()).collect();
        let counts: Vec<i32> = batch.iter().map(|i| i.impressions).collect();

        self.client
            .execute(
                "INSERT INTO impressions (campaign_id, audience_id, impressions) \
                 SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::int4[])",
                &[&campaign_ids, &audience_ids, &counts],
            )
            .await
    }

    async fn insert_spends(&self, batch: Vec<Spend>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("spends", batch.len()));
        }

        let ids: Vec<&str> = batch.iter().map(|s| s.id.as_str()).collect();
        let campaign_ids: Vec<Uuid> = batch.iter().map(|s| s.campaign_id).collect();
        let audience_ids: Vec<&str> = batch.iter().map(|s| s.audience_id.as_str()).collect();
        let ad_type_ids: Vec<&str> = batch.iter().map(|s| s.ad_type_id.as_str()).collect();
        let date_ids: Vec<NaiveDate> = batch.iter().map(|s| s.date_id).collect();
        let spends: Vec<Decimal> = batch.iter().map(|s| s.spend).collect();

        self.client
            .execute(
                "INSERT INTO spends (id, campaign_id, audience_id, ad_type_id, date_id, spend) \
                 SELECT * FROM UNNEST($1::text[], $2::uuid[], $3::text[], $4::text[], \
                 $5::date[], $6::numeric[])",
                &[
                    &ids,
                    &campaign_ids,
                    &audience_ids,
                    &ad_type_ids,
                    &date_ids,
                    &spends,
                ],
            )
            .await
    }

    async fn insert_stats(&self, batch: Vec<Stat>) -> Result<u64> {
        if self.dry_run {
            return Ok(self.skip_write("stats", batch.len()));
        }

        let spend_ids: Vec<&str> = batch.iter().map(|s| s.spend_id.as_str()).collect();
        let campaign_ids: Vec<Uuid> = batch.iter().map(|s| s.campaign_id).collect();
        let audience_ids: Vec<&str> = batch.iter().map(|s| s.audience_id.as_str()).collect();
        let ad_type_ids: Vec<&str> = batch.iter().map(|s| s.ad_type_id.as_str()).collect();
        let date_ids: Vec<NaiveDate> = batch.iter().map(|s| s.date_id).collect();
        let source_ids: Vec<&str> = batch.iter().map(|s| s.source_id.as_str()).collect();
        let action_ids: Vec<&str> = batch.iter().map(|s| s.action_id.as_str()).collect();
        let counts: Vec<i32> = batch.iter().map(|s| s.count).collect();

        self.client
            .execute(
                "INSERT INTO stats (spend_id, campaign_id, audience_id, ad_type_id, date_id, \
                 source_id, action_id, count) \
                 SELECT * FROM UNNEST($1::text[], $2::uuid[], $3::text[], $4::text[], \
                 $5::date[], $6::text[], $7::text[], $8::int4[])",
                &[
                    &spend_ids,
                    &campaign_ids,
                    &audience_ids,
                    &ad_type_ids,
                    &date_ids,
                    &source_ids,
                    &action_ids,
                    &counts,
                ],
            )
            .await
    }

    async fn delete_all_rows(&self) -> Result<u64> {
        if self.dry_run {
            tracing::info!("DRY RUN: Would delete all rows");
            return Ok(0);
        }

        // Raw deletes, facts before dimensions, so no statement trips a
        // foreign key.
        let tables = [
            "stats",
            "impressions",
            "spends",
            "ad_types",
            "sources",
            "actions",
            "dates",
            "audiences",
            "campaigns",
        ];

        let mut deleted = 0;
        for table in tables {
            let affected = self
                .client
                .execute(&format!("DELETE FROM {table}"), &[])
                .await?;
            tracing::debug!(table, rows = affected, "Deleted rows");
            deleted += affected;
        }

        tracing::info!(rows = deleted, "Deleted all existing data");
        Ok(deleted)
    }
}
