//! Command implementations

pub mod init;
pub mod load;
pub mod report;
pub mod reset;
pub mod validate;

use crate::adapters::postgresql::PostgreSQLClient;
use crate::config::AdloadConfig;
use crate::domain::Result;

/// Builds a PostgreSQL client, verifies the connection, and bootstraps the
/// schema.
pub(crate) async fn connect(config: &AdloadConfig) -> Result<PostgreSQLClient> {
    let client = PostgreSQLClient::new(config.postgresql.clone())?;
    client.test_connection().await?;
    client.ensure_schema_exists().await?;
    Ok(client)
}

/// Asks for confirmation on stdin, returning whether the user agreed
pub(crate) fn confirm(prompt: &str) -> std::io::Result<bool> {
    use std::io::{self, Write};

    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
