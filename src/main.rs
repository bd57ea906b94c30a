mod api;
mod auth;
mod collector;
mod config;
mod constants;
mod error;
mod match_stats;
mod models;
mod report;
mod store;

use api::{ApiClient, RosterSource};
use clap::Parser;
use config::{Cli, Config, PointsColumn};
use constants::*;
use error::Result;
use report::ReportSummary;
use std::path::Path;
use store::{FirestoreStore, ScoutingStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = Config::from_env(cli)?;
    let roster = ApiClient::new(API_BASE_URL.to_string(), config.tba_auth_key.clone())?;
    let store = FirestoreStore::connect(&config).await?;

    log::info!("Starting analysis for {}", config.event_code);
    let summary = run(
        &roster,
        &store,
        &config.event_code,
        &config.output,
        config.points_column,
    )
    .await?;

    println!(
        "Wrote {} teams to {} ({} skipped)",
        summary.written,
        config.output.display(),
        summary.skipped
    );
    Ok(())
}

/// Roster -> stored scouting data -> report. Only a failure to write the
/// report itself is returned as an error.
async fn run<R: RosterSource, S: ScoutingStore>(
    roster: &R,
    store: &S,
    event_code: &str,
    output: &Path,
    points_column: PointsColumn,
) -> Result<ReportSummary> {
    let teams = api::list_teams(roster, event_code).await;
    let scouted = collector::collect_all(store, &teams).await;
    report::write_report(&scouted, output, points_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeRoster;
    use crate::models::{ActionType, MatchRecord};
    use crate::store::memory::MemoryStore;
    use serde_json::json;
    use std::fs;

    fn make_match(id: &str, labels: &[&str]) -> MatchRecord {
        MatchRecord {
            id: id.to_string(),
            match_type: "QM".to_string(),
            actions: labels.iter().map(|l| ActionType::from_label(l)).collect(),
        }
    }

    fn pit_record(features: &str) -> serde_json::Value {
        json!({
            "accuracy": "high",
            "autonBalls": 4,
            "autonRoutine": "four ball",
            "badFalcons": true,
            "climbLocations": ["HIGH", "TRAVERSAL"],
            "drivebaseType": "swerve",
            "driverExperience": "veteran",
            "features": features
        })
    }

    #[tokio::test]
    async fn test_roster_failure_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2022cada.csv");
        let roster = FakeRoster { keys: None };
        let store = MemoryStore::default().with_team("254", pit_record("turret"), vec![]);

        let summary = run(&roster, &store, "2022cada", &path, PointsColumn::Pieces)
            .await
            .unwrap();

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{}\n", CSV_HEADER.join(","))
        );
    }

    #[tokio::test]
    async fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2022cada.csv");
        let roster = FakeRoster {
            keys: Some(vec!["frc1678", "frc9999", "frc254", "frc971"]),
        };
        let store = MemoryStore::default()
            .with_team(
                "254",
                pit_record("turret, vision"),
                vec![make_match(
                    "1",
                    &["SHOT_UPPER", "MISSED_UPPER", "SHOT_LOWER", "CLIMB_MID"],
                )],
            )
            .with_team(
                "1678",
                pit_record("climber"),
                vec![
                    make_match("1", &["CLIMB_TRAVERSAL"]),
                    make_match("2", &["CLIMB_HIGH", "CLIMB_LOW"]),
                ],
            )
            // no matches yet, so no averages to report
            .with_team("971", pit_record("arm"), vec![]);

        let summary = run(&roster, &store, "2022cada", &path, PointsColumn::Points)
            .await
            .unwrap();
        assert_eq!(summary, ReportSummary { written: 2, skipped: 1 });

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1678,high,4,four ball,True,HIGH and TRAVERSAL,swerve,veteran,climber,\
             0.0,0.0,0,3.5,0.0,1,12.5,2"
        );
        assert!(lines[2].starts_with("254,"));
        assert!(lines[2].contains(",turret; vision,"));
        assert!(lines[2].ends_with(",9.0,1"));
        for line in &lines {
            assert_eq!(line.split(',').count(), 17);
        }
    }
}
