//! Configuration management
//!
//! TOML configuration with `${VAR}` environment substitution and `ADLOAD_*`
//! environment overrides.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{AdloadConfig, ApplicationConfig, LoadConfig, LoggingConfig, PostgreSQLConfig};
