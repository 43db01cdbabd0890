//! Dependency resolver for loader graphs
//!
//! Given a top-level loader kind, the resolver walks the static requirement
//! graph with an explicit work-list and instantiates every transitively
//! required loader exactly once. Instances are shared: a kind required by
//! two different parents (diamond dependency) resolves to the same loader,
//! so its pending cache and its flush happen once per run.

use crate::adapters::store::MetricStore;
use crate::core::load::dimensions::{
    ActionLoader, AdTypeLoader, AudienceLoader, CampaignLoader, DateLoader, SourceLoader,
};
use crate::core::load::facts::{ImpressionLoader, SpendLoader, StatLoader};
use crate::core::load::loader::{LoaderKind, RecordKey, RecordLoader};
use crate::core::load::row::InputRow;
use crate::domain::{LoadError, Result};
use std::collections::HashMap;

/// The resolved loader graph for one load run
///
/// Passed by reference into every `cache_row` and `flush` call so loaders
/// can reach their siblings; never a process-wide singleton.
pub struct LoaderSet {
    loaders: HashMap<LoaderKind, Box<dyn RecordLoader>>,
}

impl LoaderSet {
    /// Resolves the loader graph rooted at `root`
    ///
    /// Work-list traversal of the requirement graph; each kind is
    /// instantiated at most once, and the root itself is part of the set.
    pub fn resolve(root: LoaderKind) -> Self {
        let mut loaders: HashMap<LoaderKind, Box<dyn RecordLoader>> = HashMap::new();
        let mut work = vec![root];

        while let Some(kind) = work.pop() {
            if loaders.contains_key(&kind) {
                continue;
            }
            loaders.insert(kind, instantiate(kind));
            work.extend_from_slice(kind.requires());
        }

        tracing::debug!(root = %root, loaders = loaders.len(), "Resolved loader graph");
        Self { loaders }
    }

    /// Looks up the shared loader instance for a kind
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Configuration` if the kind was not part of the
    /// resolved graph; that means a loader declared a requirement its own
    /// `requires` list does not reach, which is a wiring bug.
    pub fn loader(&self, kind: LoaderKind) -> Result<&dyn RecordLoader> {
        self.loaders
            .get(&kind)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| {
                LoadError::Configuration(format!(
                    "loader `{kind}` is not part of the resolved graph"
                ))
            })
    }

    /// Convenience dispatch: caches a row through the loader for `kind`
    pub async fn cache_row(
        &self,
        kind: LoaderKind,
        store: &dyn MetricStore,
        row: &InputRow,
    ) -> Result<RecordKey> {
        self.loader(kind)?.cache_row(self, store, row).await
    }

    /// Number of loader instances in the set
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Whether a kind was resolved into the set
    pub fn contains(&self, kind: LoaderKind) -> bool {
        self.loaders.contains_key(&kind)
    }
}

fn instantiate(kind: LoaderKind) -> Box<dyn RecordLoader> {
    match kind {
        LoaderKind::Campaign => Box::new(CampaignLoader::new()),
        LoaderKind::Audience => Box::new(AudienceLoader::new()),
        LoaderKind::AdType => Box::new(AdTypeLoader::new()),
        LoaderKind::Date => Box::new(DateLoader::new()),
        LoaderKind::Source => Box::new(SourceLoader::new()),
        LoaderKind::Action => Box::new(ActionLoader::new()),
        LoaderKind::Impression => Box::new(ImpressionLoader::new()),
        LoaderKind::Spend => Box::new(SpendLoader::new()),
        LoaderKind::Stat => Box::new(StatLoader::new()),
    }
}
