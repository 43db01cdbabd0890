//! The bulk-load pipeline
//!
//! Dependency-ordered, deduplicating batch loading: a resolver builds the
//! loader graph for the selected top-level kind, the driver streams CSV rows
//! through it, and the flush phase writes one batch per loader with every
//! dependency's batch written first.

pub mod dimensions;
pub mod driver;
pub mod facts;
pub mod loader;
pub mod resolver;
pub mod row;

pub use driver::{run_load, LoadSummary};
pub use loader::{LoaderKind, RecordKey, RecordLoader};
pub use resolver::LoaderSet;
pub use row::InputRow;
