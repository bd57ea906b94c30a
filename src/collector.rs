use crate::match_stats::aggregate_matches;
use crate::models::{ScoutedTeam, TeamId};
use crate::store::ScoutingStore;

/// Look up every team in roster order and attach its match statistics.
/// Teams without a stored record, or whose data cannot be read, are left out.
pub async fn collect_all<S: ScoutingStore>(store: &S, teams: &[TeamId]) -> Vec<ScoutedTeam> {
    let mut scouted = Vec::with_capacity(teams.len());

    for team in teams {
        let record = match store.team_record(team).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::warn!("Could not find scouting data for {}", team);
                continue;
            }
            Err(e) => {
                log::warn!("Failed to read scouting data for {}: {}", team, e);
                continue;
            }
        };
        log::info!("Got scouting data for team {}", team);

        let matches = match store.match_records(team).await {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Failed to read matches for {}: {}", team, e);
                continue;
            }
        };

        scouted.push(ScoutedTeam {
            team: team.clone(),
            record,
            stats: aggregate_matches(team, &matches),
        });
    }

    scouted
}
