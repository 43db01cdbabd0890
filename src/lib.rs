// Adload - Campaign Metrics CSV Loader
// Copyright (c) 2025 Adload Contributors
// Licensed under the MIT License

//! # Adload - Campaign Metrics Bulk Loader
//!
//! Adload is a bulk-load tool built in Rust that ingests CSV files of
//! advertising campaign metrics and materializes them into a normalized
//! PostgreSQL schema using batched inserts.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** the dependency graph between record loaders
//! - **Deduplicating** dimension records by natural key during a run
//! - **Parsing** compact input encodings (audience keys, embedded actions JSON)
//! - **Flushing** one batched insert per loader in dependency order
//!
//! ## Architecture
//!
//! Adload follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (load pipeline, reporting queries)
//! - [`adapters`] - External integrations (PostgreSQL)
//! - [`domain`] - Core domain types and parsers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adload::adapters::postgresql::{PostgreSQLClient, PostgresStore};
//! use adload::config::load_config;
//! use adload::core::load::{run_load, LoaderKind};
//! use std::fs::File;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("adload.toml")?;
//!
//!     let client = PostgreSQLClient::new(config.postgresql.clone())?;
//!     client.ensure_schema_exists().await?;
//!     let store = PostgresStore::new(Arc::new(client), false);
//!
//!     let file = File::open("stats.csv")?;
//!     let summary = run_load(LoaderKind::Stat, file, &store, 10_000).await?;
//!
//!     println!("Loaded {} rows", summary.rows_read);
//!     Ok(())
//! }
//! ```
//!
//! ## Load semantics
//!
//! A load run is single-threaded and synchronous: rows stream through the
//! top-level loader's row cache (recursively triggering dependency loaders),
//! and all pending records stay in memory until the flush phase writes each
//! loader's batch after its dependencies. The first unrecovered error aborts
//! the run; batches already flushed are not rolled back.
//!
//! ## Error Handling
//!
//! Adload uses the [`domain::LoadError`] type for all errors:
//!
//! ```rust,no_run
//! use adload::domain::LoadError;
//!
//! fn example() -> Result<(), LoadError> {
//!     let config = adload::config::load_config("adload.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Adload uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting load");
//! warn!(loader = "spend", "Empty batch");
//! error!(error = "boom", "Load failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
