//! Report command implementation
//!
//! This module implements the `report` command that runs the reporting
//! queries over the loaded schema and prints their results as JSON.

use crate::cli::commands::connect;
use crate::config::load_config;
use crate::core::report::{run_report, ReportKind};
use clap::{Args, ValueEnum};
use serde_json::{Map, Value};

/// Report selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportName {
    /// Run every report
    All,
    TotalSpentPurpleHair,
    CampaignsSpentMoreFourDays,
    SourceHReportedClicks,
    SourcesMoreJunkThanNoise,
    TotalCostPerViewForVideo,
    SourceBConversionsNy,
    BestCpmCombo,
}

impl std::fmt::Display for ReportName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no skipped variants")
            .get_name()
            .fmt(f)
    }
}

impl ReportName {
    fn kinds(self) -> Vec<ReportKind> {
        match self {
            ReportName::All => ReportKind::ALL.to_vec(),
            ReportName::TotalSpentPurpleHair => vec![ReportKind::TotalSpentPurpleHair],
            ReportName::CampaignsSpentMoreFourDays => vec![ReportKind::CampaignsSpentMoreFourDays],
            ReportName::SourceHReportedClicks => vec![ReportKind::SourceHReportedClicks],
            ReportName::SourcesMoreJunkThanNoise => vec![ReportKind::SourcesMoreJunkThanNoise],
            ReportName::TotalCostPerViewForVideo => vec![ReportKind::TotalCostPerViewForVideo],
            ReportName::SourceBConversionsNy => vec![ReportKind::SourceBConversionsNy],
            ReportName::BestCpmCombo => vec![ReportKind::BestCpmCombo],
        }
    }
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Which report to run
    #[arg(value_enum, default_value_t = ReportName::All)]
    pub report: ReportName,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(report = ?self.report, "Starting report command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let client = match connect(&config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database");
                eprintln!("Failed to connect to database: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let mut output = Map::new();
        for kind in self.report.kinds() {
            let result = run_report(&client, kind).await?;
            output.insert(kind.name().to_string(), result);
        }

        println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
        Ok(0)
    }
}
