//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(path = %config_path, "Validating configuration");

        println!("🔎 Validating configuration: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!("   Log level:          {}", config.application.log_level);
                println!("   Dry run:            {}", config.application.dry_run);
                println!("   Pool size:          {}", config.postgresql.max_connections);
                println!(
                    "   Progress interval:  {} rows",
                    config.load.progress_interval_rows
                );
                println!("   File logging:       {}", config.logging.local_enabled);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                Ok(2) // Configuration error exit code
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_file_returns_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
