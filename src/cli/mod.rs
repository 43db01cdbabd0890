//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Adload using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Adload - campaign metrics CSV loader
#[derive(Parser, Debug)]
#[command(name = "adload")]
#[command(version, about, long_about = None)]
#[command(author = "Adload Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "adload.toml", env = "ADLOAD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ADLOAD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a CSV file into the database
    Load(commands::load::LoadArgs),

    /// Delete every row from every table
    Reset(commands::reset::ResetArgs),

    /// Run reporting queries over the loaded data
    Report(commands::report::ReportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_load() {
        let cli = Cli::parse_from(["adload", "load", "impressions", "data.csv"]);
        assert_eq!(cli.config, "adload.toml");
        assert!(matches!(cli.command, Commands::Load(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["adload", "--config", "custom.toml", "reset"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["adload", "--log-level", "debug", "reset"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_load_with_delete() {
        let cli = Cli::parse_from(["adload", "load", "stats", "data.csv", "--delete"]);
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert!(args.delete);
    }

    #[test]
    fn test_cli_parse_report() {
        let cli = Cli::parse_from(["adload", "report"]);
        assert!(matches!(cli.command, Commands::Report(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["adload", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["adload", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
