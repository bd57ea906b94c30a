use crate::config::PointsColumn;
use crate::constants::CSV_HEADER;
use crate::error::Result;
use crate::models::{ScoutedTeam, TeamRecord};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Write the report to `path`, replacing any previous contents.
/// Teams missing a required field are skipped and logged.
pub fn write_report(
    teams: &[ScoutedTeam],
    path: &Path,
    points_column: PointsColumn,
) -> Result<ReportSummary> {
    // Cells are pre-sanitised; the csv writer must not add quoting
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;

    let mut summary = ReportSummary::default();
    for team in teams {
        match render_row(team, points_column) {
            Ok(row) => {
                writer.write_record(&row)?;
                summary.written += 1;
            }
            Err(missing) => {
                log::warn!("Invalid data for {}: missing {}", team.team, missing);
                summary.skipped += 1;
            }
        }
    }

    writer.flush()?;
    log::info!(
        "Report written to {} ({} teams, {} skipped)",
        path.display(),
        summary.written,
        summary.skipped
    );
    Ok(summary)
}

/// Render one team's row, or name the first field that is missing
fn render_row(
    team: &ScoutedTeam,
    points_column: PointsColumn,
) -> std::result::Result<Vec<String>, &'static str> {
    let record = &team.record;
    let stats = &team.stats;
    let averages = stats.averages.ok_or("match averages")?;

    let points = match points_column {
        PointsColumn::Pieces => averages.average_pieces_scored,
        PointsColumn::Points => averages.average_points_scored,
    };
    // Shot ratios fall back to whole-number sentinels when nothing was shot
    let (scouted_accuracy, high_hub_ratio) = if stats.total_shots == 0 {
        ("0".to_string(), "1".to_string())
    } else {
        (
            number_cell(stats.scouted_accuracy),
            number_cell(stats.high_hub_ratio),
        )
    };

    Ok(vec![
        team.team.to_string(),
        text_cell(required(record, "accuracy")?),
        text_cell(required(record, "autonBalls")?),
        text_cell(required(record, "autonRoutine")?),
        text_cell(required(record, "badFalcons")?),
        list_cell(required(record, "climbLocations")?),
        text_cell(required(record, "drivebaseType")?),
        text_cell(required(record, "driverExperience")?),
        text_cell(required(record, "features")?),
        number_cell(averages.avg_low_hub_shots),
        number_cell(averages.avg_high_hub_shots),
        scouted_accuracy,
        number_cell(averages.average_climb_level),
        number_cell(averages.average_pieces_scored),
        high_hub_ratio,
        number_cell(points),
        stats.total_matches.to_string(),
    ])
}

fn required<'a>(
    record: &'a TeamRecord,
    name: &'static str,
) -> std::result::Result<&'a Value, &'static str> {
    match record.get(name) {
        Some(Value::Null) | None => Err(name),
        Some(value) => Ok(value),
    }
}

/// Averages keep a decimal point even when whole, e.g. `9.0`
fn number_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Scalar cell with commas swapped for semicolons
fn text_cell(value: &Value) -> String {
    plain(value).replace(',', ";")
}

/// List cell, e.g. `["MID", "HIGH"]` -> `MID and HIGH`
fn list_cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text_cell)
            .collect::<Vec<_>>()
            .join(" and "),
        other => plain(other).replace(',', " and "),
    }
}
