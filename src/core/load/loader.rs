//! Loader framework: kinds, keys, pending caches, and the loader trait
//!
//! Every record type has a loader. A loader caches rows during the streaming
//! phase and writes its accumulated batch in one insert during the flush
//! phase, after every loader it depends on has flushed. Dedup-keyed loaders
//! hold a pending map by natural key; append-only loaders hold a pending
//! list.

use crate::adapters::store::MetricStore;
use crate::core::load::resolver::LoaderSet;
use crate::core::load::row::InputRow;
use crate::domain::{LoadError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Mutex;
use uuid::Uuid;

/// The loader variants, one per record type
///
/// The dependency graph between kinds is static: `requires` lists the kinds
/// whose records a loader references by foreign key and therefore must flush
/// first. The graph is acyclic by construction; a cycle would be a
/// configuration bug, not an input condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    Campaign,
    Audience,
    AdType,
    Date,
    Source,
    Action,
    Impression,
    Spend,
    Stat,
}

impl LoaderKind {
    /// Directly required loader kinds
    pub const fn requires(self) -> &'static [LoaderKind] {
        match self {
            LoaderKind::Campaign
            | LoaderKind::AdType
            | LoaderKind::Date
            | LoaderKind::Source
            | LoaderKind::Action => &[],
            LoaderKind::Audience => &[LoaderKind::Campaign],
            LoaderKind::Impression => &[LoaderKind::Campaign, LoaderKind::Audience],
            LoaderKind::Spend => &[
                LoaderKind::Campaign,
                LoaderKind::Audience,
                LoaderKind::AdType,
                LoaderKind::Date,
            ],
            LoaderKind::Stat => &[
                LoaderKind::Campaign,
                LoaderKind::Audience,
                LoaderKind::Source,
                LoaderKind::AdType,
                LoaderKind::Action,
                LoaderKind::Date,
                LoaderKind::Spend,
            ],
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderKind::Campaign => "campaign",
            LoaderKind::Audience => "audience",
            LoaderKind::AdType => "ad_type",
            LoaderKind::Date => "date",
            LoaderKind::Source => "source",
            LoaderKind::Action => "action",
            LoaderKind::Impression => "impression",
            LoaderKind::Spend => "spend",
            LoaderKind::Stat => "stat",
        };
        write!(f, "{name}")
    }
}

/// Primary-key reference returned by `cache_row`
///
/// Dependent loaders use these to populate foreign keys; the referenced
/// record is either already persisted or pending in the owning loader's
/// cache, and is guaranteed to flush first.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKey {
    Campaign(Uuid),
    Audience(String),
    AdType(String),
    Date(NaiveDate),
    Source(String),
    Action(String),
    Spend(String),
    /// Append-only fact loaders have no key to hand back
    Fact,
}

impl RecordKey {
    pub fn into_campaign(self) -> Result<Uuid> {
        match self {
            RecordKey::Campaign(id) => Ok(id),
            other => Err(unexpected_key("campaign", &other)),
        }
    }

    pub fn into_audience(self) -> Result<String> {
        match self {
            RecordKey::Audience(id) => Ok(id),
            other => Err(unexpected_key("audience", &other)),
        }
    }

    pub fn into_ad_type(self) -> Result<String> {
        match self {
            RecordKey::AdType(id) => Ok(id),
            other => Err(unexpected_key("ad_type", &other)),
        }
    }

    pub fn into_date(self) -> Result<NaiveDate> {
        match self {
            RecordKey::Date(id) => Ok(id),
            other => Err(unexpected_key("date", &other)),
        }
    }

    pub fn into_source(self) -> Result<String> {
        match self {
            RecordKey::Source(id) => Ok(id),
            other => Err(unexpected_key("source", &other)),
        }
    }

    pub fn into_action(self) -> Result<String> {
        match self {
            RecordKey::Action(id) => Ok(id),
            other => Err(unexpected_key("action", &other)),
        }
    }

    pub fn into_spend(self) -> Result<String> {
        match self {
            RecordKey::Spend(id) => Ok(id),
            other => Err(unexpected_key("spend", &other)),
        }
    }
}

fn unexpected_key(expected: &str, got: &RecordKey) -> LoadError {
    LoadError::Configuration(format!("expected a {expected} key, got {got:?}"))
}

/// Pending cache for dedup-keyed loaders
///
/// Holds at most one record per natural key within a load run. Admitting a
/// key already present is a no-op; the first admission of a new key logs the
/// "will create" notice.
pub struct KeyedCache<K, E> {
    kind: LoaderKind,
    pending: Mutex<HashMap<K, E>>,
}

impl<K, E> KeyedCache<K, E>
where
    K: Eq + Hash + fmt::Display,
{
    pub fn new(kind: LoaderKind) -> Self {
        Self {
            kind,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts the record unless the key is already pending
    pub fn admit(&self, key: K, record: E) {
        let mut pending = self.pending.lock().unwrap();
        if !pending.contains_key(&key) {
            tracing::info!(loader = %self.kind, key = %key, "Will create new record");
            pending.insert(key, record);
        }
    }

    /// Takes every pending record, leaving the cache empty
    pub fn drain(&self) -> Vec<E> {
        let mut pending = self.pending.lock().unwrap();
        pending.drain().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pending list for append-only fact loaders: no lookup, no dedup
pub struct AppendCache<E> {
    pending: Mutex<Vec<E>>,
}

impl<E> AppendCache<E> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, record: E) {
        self.pending.lock().unwrap().push(record);
    }

    pub fn extend(&self, records: Vec<E>) {
        self.pending.lock().unwrap().extend(records);
    }

    /// Takes every pending record, leaving the list empty
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for AppendCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A record loader: caches input rows, then flushes one batch
///
/// `cache_row` resolves the row into a primary-key reference, creating a
/// pending record when the key is new, reusing the persisted or pending one
/// otherwise. Resolving may recurse into dependency loaders through the
/// shared [`LoaderSet`]. `flush` walks the requirement graph depth-first so
/// every dependency's batch is written before this loader's.
#[async_trait]
pub trait RecordLoader: Send + Sync {
    /// The kind this loader instance handles
    fn kind(&self) -> LoaderKind;

    /// Resolves one input row to a record reference, caching new records
    async fn cache_row(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey>;

    /// Writes this loader's accumulated batch in a single insert
    ///
    /// Returns the number of records written. An empty batch is skipped
    /// without touching the store and without logging.
    async fn flush_pending(&self, store: &dyn MetricStore) -> Result<u64>;

    /// Flushes dependencies, then this loader's own batch
    ///
    /// Marks this kind visited before recursing so that a loader reachable
    /// through several paths in the graph is flushed exactly once. Relies on
    /// the requirement graph being acyclic. Returns the total number of
    /// records written by this call, dependencies included.
    async fn flush(
        &self,
        ctx: &LoaderSet,
        store: &dyn MetricStore,
        visited: &mut HashSet<LoaderKind>,
    ) -> Result<u64> {
        visited.insert(self.kind());

        let mut written = 0;
        for dep in self.kind().requires() {
            if visited.contains(dep) {
                continue;
            }
            written += ctx.loader(*dep)?.flush(ctx, store, visited).await?;
        }

        written += self.flush_pending(store).await?;
        Ok(written)
    }
}

impl fmt::Debug for dyn RecordLoader + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordLoader({})", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_kinds_require_nothing() {
        assert!(LoaderKind::Campaign.requires().is_empty());
        assert!(LoaderKind::Source.requires().is_empty());
    }

    #[test]
    fn test_stat_requires_spend() {
        assert!(LoaderKind::Stat.requires().contains(&LoaderKind::Spend));
    }

    #[test]
    fn test_keyed_cache_admits_once() {
        let cache: KeyedCache<String, u32> = KeyedCache::new(LoaderKind::AdType);
        cache.admit("video".to_string(), 1);
        cache.admit("video".to_string(), 2);
        assert_eq!(cache.len(), 1);

        let drained = cache.drain();
        assert_eq!(drained, vec![1]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_append_cache_accumulates_duplicates() {
        let cache = AppendCache::new();
        cache.push(7);
        cache.push(7);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.drain(), vec![7, 7]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_record_key_mismatch_is_configuration_error() {
        let err = RecordKey::Fact.into_campaign().unwrap_err();
        assert!(matches!(err, LoadError::Configuration(_)));
    }

    #[test]
    fn test_loader_kind_display() {
        assert_eq!(LoaderKind::AdType.to_string(), "ad_type");
        assert_eq!(LoaderKind::Stat.to_string(), "stat");
    }
}
