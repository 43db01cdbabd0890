//! Load driver
//!
//! Resolves the loader graph for a top-level kind, streams CSV rows through
//! its `cache_row` (which recursively triggers dependency loaders), then
//! runs the flush phase that walks the graph writing each batch before its
//! dependents. The whole run is synchronous from the pipeline's point of
//! view: one pass over the input, all pending records held in memory until
//! the final flush, and the first unrecovered error aborts the run. Batches
//! already written by earlier flush steps are not rolled back.

use crate::adapters::store::MetricStore;
use crate::core::load::loader::LoaderKind;
use crate::core::load::resolver::LoaderSet;
use crate::core::load::row::InputRow;
use crate::domain::Result;
use std::collections::HashSet;
use std::io::Read;

/// Outcome of one load invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// CSV rows streamed through the top-level loader
    pub rows_read: u64,

    /// Records written across every loader during the flush phase
    pub records_written: u64,
}

/// Runs one full load invocation
///
/// # Arguments
///
/// * `kind` - Top-level loader kind selected by the caller
/// * `input` - CSV source with a header row
/// * `store` - Backing store the flush phase writes through
/// * `progress_interval` - Log a progress event every N rows (0 disables)
///
/// # Errors
///
/// Returns the first error raised while decoding, caching, or flushing;
/// nothing is retried and nothing already flushed is rolled back.
pub async fn run_load<R: Read>(
    kind: LoaderKind,
    input: R,
    store: &dyn MetricStore,
    progress_interval: u64,
) -> Result<LoadSummary> {
    let set = LoaderSet::resolve(kind);
    let root = set.loader(kind)?;

    tracing::info!(loader = %kind, "Starting load");

    let mut reader = csv::Reader::from_reader(input);
    let mut rows_read: u64 = 0;

    for record in reader.deserialize::<InputRow>() {
        let row = record?;
        rows_read += 1;

        if let Err(e) = root.cache_row(&set, store, &row).await {
            tracing::error!(row = rows_read, error = %e, "Aborting load: failed to cache row");
            return Err(e);
        }

        if progress_interval > 0 && rows_read % progress_interval == 0 {
            tracing::info!(rows = rows_read, "Caching rows");
        }
    }

    tracing::info!(rows = rows_read, "Input consumed, flushing batches");

    let mut visited = HashSet::new();
    let records_written = root.flush(&set, store, &mut visited).await?;

    tracing::info!(
        rows = rows_read,
        records = records_written,
        "Load completed"
    );

    Ok(LoadSummary {
        rows_read,
        records_written,
    })
}
