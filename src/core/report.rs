//! Reporting queries over the loaded schema
//!
//! Read-side aggregates issued as raw SQL against the same tables the load
//! pipeline writes. The pipeline itself has no dependency on this module;
//! it exists for the `report` CLI command.

use crate::adapters::postgresql::PostgreSQLClient;
use crate::domain::Result;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fmt;

/// The available reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Total amount spent on audiences with purple hair
    TotalSpentPurpleHair,
    /// Number of campaigns that spent money on more than four distinct days
    CampaignsSpentMoreFourDays,
    /// Clicks reported by source H, with and without zero counts
    SourceHReportedClicks,
    /// Sources that reported more junk than noise
    SourcesMoreJunkThanNoise,
    /// Total cost per view across video ads
    TotalCostPerViewForVideo,
    /// Conversions reported by source B for New York audiences
    SourceBConversionsNy,
    /// (state, hair color) combination with the best CPM
    BestCpmCombo,
}

impl ReportKind {
    /// Every report, in display order
    pub const ALL: [ReportKind; 7] = [
        ReportKind::TotalSpentPurpleHair,
        ReportKind::CampaignsSpentMoreFourDays,
        ReportKind::SourceHReportedClicks,
        ReportKind::SourcesMoreJunkThanNoise,
        ReportKind::TotalCostPerViewForVideo,
        ReportKind::SourceBConversionsNy,
        ReportKind::BestCpmCombo,
    ];

    /// Stable name used as the JSON key in report output
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::TotalSpentPurpleHair => "total_spent_purple_hair",
            ReportKind::CampaignsSpentMoreFourDays => "campaigns_spent_more_4_days",
            ReportKind::SourceHReportedClicks => "source_h_reported_clicks",
            ReportKind::SourcesMoreJunkThanNoise => "sources_more_junk_than_noise",
            ReportKind::TotalCostPerViewForVideo => "total_cost_per_view_for_video",
            ReportKind::SourceBConversionsNy => "source_b_conversions_ny",
            ReportKind::BestCpmCombo => "best_cpm_combo",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runs one report and returns its result as JSON
///
/// # Errors
///
/// Returns an error if the underlying query fails.
pub async fn run_report(client: &PostgreSQLClient, kind: ReportKind) -> Result<Value> {
    match kind {
        ReportKind::TotalSpentPurpleHair => total_spent_purple_hair(client).await,
        ReportKind::CampaignsSpentMoreFourDays => campaigns_spent_more_four_days(client).await,
        ReportKind::SourceHReportedClicks => source_h_reported_clicks(client).await,
        ReportKind::SourcesMoreJunkThanNoise => sources_more_junk_than_noise(client).await,
        ReportKind::TotalCostPerViewForVideo => total_cost_per_view_for_video(client).await,
        ReportKind::SourceBConversionsNy => source_b_conversions_ny(client).await,
        ReportKind::BestCpmCombo => best_cpm_combo(client).await,
    }
}

async fn total_spent_purple_hair(client: &PostgreSQLClient) -> Result<Value> {
    let row = client
        .query_opt(
            "SELECT SUM(s.spend) FROM spends s \
             JOIN audiences a ON s.audience_id = a.id \
             WHERE a.hair_color = 'purple'",
            &[],
        )
        .await?;

    let total: Option<Decimal> = row.and_then(|r| r.get(0));
    Ok(json!(total.map(|t| t.to_string())))
}

async fn campaigns_spent_more_four_days(client: &PostgreSQLClient) -> Result<Value> {
    let row = client
        .query_opt(
            "SELECT COUNT(*) FROM ( \
                 SELECT s.campaign_id FROM spends s \
                 WHERE s.spend > 0 \
                 GROUP BY s.campaign_id \
                 HAVING COUNT(DISTINCT s.date_id) > 4 \
             ) c",
            &[],
        )
        .await?;

    let count: i64 = row.map(|r| r.get(0)).unwrap_or(0);
    Ok(json!(count))
}

async fn source_h_reported_clicks(client: &PostgreSQLClient) -> Result<Value> {
    let nonzero = count_stats(client, "H", "clicks", true).await?;
    let all = count_stats(client, "H", "clicks", false).await?;

    Ok(json!({
        "excluding_0": nonzero,
        "including_0": all,
    }))
}

async fn count_stats(
    client: &PostgreSQLClient,
    source: &str,
    action: &str,
    nonzero_only: bool,
) -> Result<i64> {
    let query = if nonzero_only {
        "SELECT COUNT(*) FROM stats WHERE source_id = $1 AND action_id = $2 AND count > 0"
    } else {
        "SELECT COUNT(*) FROM stats WHERE source_id = $1 AND action_id = $2"
    };

    let row = client.query_opt(query, &[&source, &action]).await?;
    Ok(row.map(|r| r.get(0)).unwrap_or(0))
}

async fn sources_more_junk_than_noise(client: &PostgreSQLClient) -> Result<Value> {
    let all_rows = client
        .query(
            "SELECT s.id FROM sources s \
             LEFT JOIN stats st ON st.source_id = s.id \
             GROUP BY s.id \
             HAVING COUNT(*) FILTER (WHERE st.action_id = 'junk') \
                  > COUNT(*) FILTER (WHERE st.action_id = 'noise') \
             ORDER BY s.id",
            &[],
        )
        .await?;

    let nonzero_rows = client
        .query(
            "SELECT s.id FROM sources s \
             LEFT JOIN stats st ON st.source_id = s.id \
             GROUP BY s.id \
             HAVING COUNT(*) FILTER (WHERE st.action_id = 'junk' AND st.count > 0) \
                  > COUNT(*) FILTER (WHERE st.action_id = 'noise' AND st.count > 0) \
             ORDER BY s.id",
            &[],
        )
        .await?;

    let ids = |rows: Vec<tokio_postgres::Row>| -> Vec<String> {
        rows.into_iter().map(|r| r.get(0)).collect()
    };

    Ok(json!({
        "excluding_0": ids(all_rows),
        "including_0": ids(nonzero_rows),
    }))
}

async fn total_cost_per_view_for_video(client: &PostgreSQLClient) -> Result<Value> {
    let row = client
        .query_opt(
            "SELECT SUM(sp.spend) AS total_spend, SUM(v.views_sum) AS total_views \
             FROM spends sp \
             LEFT JOIN ( \
                 SELECT spend_id, SUM(count) AS views_sum FROM stats \
                 WHERE action_id = 'views' GROUP BY spend_id \
             ) v ON v.spend_id = sp.id \
             WHERE sp.ad_type_id = 'video'",
            &[],
        )
        .await?;

    let (total_spend, total_views): (Option<Decimal>, Option<Decimal>) = match row {
        Some(r) => (r.get(0), r.get(1)),
        None => (None, None),
    };

    let cost_per_view = match (total_spend, total_views) {
        (Some(spend), Some(views)) => spend.checked_div(views).map(|c| c.round_dp(2)),
        _ => None,
    };

    Ok(json!(cost_per_view.map(|c| c.to_string())))
}

async fn source_b_conversions_ny(client: &PostgreSQLClient) -> Result<Value> {
    let row = client
        .query_opt(
            "SELECT SUM(st.count) FROM stats st \
             JOIN audiences a ON st.audience_id = a.id \
             WHERE st.source_id = 'B' AND st.action_id = 'conversions' AND a.state = 'NY'",
            &[],
        )
        .await?;

    let total: Option<i64> = row.and_then(|r| r.get(0));
    Ok(json!(total))
}

async fn best_cpm_combo(client: &PostgreSQLClient) -> Result<Value> {
    let row = client
        .query_opt(
            "SELECT sum_spend.state, sum_spend.hair_color, \
                    ROUND((spend_sum / imp_sum) * 1000::numeric, 2) AS cpm \
             FROM ( \
                 SELECT DISTINCT aud.state, aud.hair_color, \
                        SUM(sp.spend) OVER (PARTITION BY aud.state, aud.hair_color) AS spend_sum \
                 FROM audiences AS aud \
                 LEFT JOIN spends AS sp ON aud.id = sp.audience_id \
             ) sum_spend \
             LEFT JOIN ( \
                 SELECT DISTINCT aud.state, aud.hair_color, \
                        SUM(imp.impressions) OVER (PARTITION BY aud.state, aud.hair_color) AS imp_sum \
                 FROM audiences AS aud \
                 LEFT JOIN impressions AS imp ON aud.id = imp.audience_id \
             ) sum_imp \
             ON sum_spend.state = sum_imp.state \
                AND sum_spend.hair_color = sum_imp.hair_color \
             ORDER BY cpm \
             LIMIT 1",
            &[],
        )
        .await?;

    Ok(match row {
        Some(r) => {
            let state: String = r.get(0);
            let hair_color: String = r.get(1);
            let cpm: Option<Decimal> = r.get(2);
            json!({
                "state": state,
                "hair_color": hair_color,
                "cpm": cpm.map(|c| c.to_string()),
            })
        }
        None => Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_names_are_stable() {
        assert_eq!(
            ReportKind::TotalSpentPurpleHair.name(),
            "total_spent_purple_hair"
        );
        assert_eq!(ReportKind::BestCpmCombo.name(), "best_cpm_combo");
    }

    #[test]
    fn test_all_reports_have_distinct_names() {
        let mut names: Vec<&str> = ReportKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ReportKind::ALL.len());
    }
}
