//! Load command implementation
//!
//! This module implements the `load` command for streaming a CSV file
//! through the bulk-load pipeline into PostgreSQL.

use crate::adapters::postgresql::PostgresStore;
use crate::adapters::store::MetricStore;
use crate::cli::commands::{confirm, connect};
use crate::config::load_config;
use crate::core::load::{run_load, LoaderKind};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

/// Kind of CSV file being loaded, selecting the top-level loader
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvType {
    /// Impressions file: campaign_id, audience, impressions
    Impressions,
    /// Stats file: campaign_id, audience, ad_type, date, spend, actions
    Stats,
}

impl CsvType {
    fn loader_kind(self) -> LoaderKind {
        match self {
            CsvType::Impressions => LoaderKind::Impression,
            CsvType::Stats => LoaderKind::Stat,
        }
    }
}

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Kind of CSV file to load
    #[arg(value_enum)]
    pub file_type: CsvType,

    /// Path to the CSV file
    pub file: PathBuf,

    /// Delete all existing rows before loading
    #[arg(long)]
    pub delete: bool,

    /// Dry run mode - stream and cache rows without writing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl LoadArgs {
    /// Execute the load command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting load command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
            println!("🔍 DRY RUN MODE - No data will be written to the database");
            println!();
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

        if self.delete {
            if !self.yes
                && !config.application.dry_run
                && !confirm("Delete ALL existing rows before loading?")?
            {
                println!("Load cancelled.");
                return Ok(0);
            }

            let deleted = store.delete_all_rows().await?;
            println!("🗑  Deleted {deleted} existing rows");
        }

        let file = File::open(&self.file)?;

        println!("🚀 Loading {} ...", self.file.display());
        let summary = run_load(
            self.file_type.loader_kind(),
            file,
            &store,
            config.load.progress_interval_rows,
        )
        .await?;

        println!();
        println!("✅ Load complete");
        println!("   Rows read:       {}", summary.rows_read);
        println!("   Records written: {}", summary.records_written);

        Ok(0)
    }
}
