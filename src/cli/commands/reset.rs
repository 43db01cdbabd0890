//! Reset command implementation
//!
//! This module implements the `reset` maintenance command that clears every
//! table with raw bulk deletes, facts before dimensions.

use crate::adapters::postgresql::PostgresStore;
use crate::adapters::store::MetricStore;
use crate::cli::commands::{confirm, connect};
use crate::config::load_config;
use clap::Args;
use std::sync::Arc;

/// Arguments for the reset command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ResetArgs {
    /// Execute the reset command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting reset command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if !self.yes && !confirm("Delete ALL rows from every table?")? {
            println!("Reset cancelled.");
            return Ok(0);
        }

        let client = match connect(&config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database");
                eprintln!("Failed to connect to database: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let store = PostgresStore::new(Arc::new(client), config.application.dry_run);
        let deleted = store.delete_all_rows().await?;

        println!("✅ Deleted {deleted} rows");
        Ok(0)
    }
}
