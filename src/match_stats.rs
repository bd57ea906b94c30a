use crate::constants::{HIGH_SHOT_POINTS, LOW_SHOT_POINTS};
use crate::models::*;

/// Fold a team's matches, in stored order, into derived statistics
pub fn aggregate_matches<'a, I>(team: &TeamId, matches: I) -> DerivedStats
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut tally = MatchTally::default();
    for record in matches {
        log::debug!("Parsing {}{} for {}", record.match_type, record.id, team);
        tally.add_match(record);
    }
    tally.build()
}

#[derive(Debug, Default)]
struct MatchTally {
    total_matches: u32,
    total_shots: u32,
    successful_shots: u32,
    high_hub_shots: u32,
    low_hub_shots: u32,
    total_match_points: u32,
    total_climb_levels: u32,
}

impl MatchTally {
    fn add_match(&mut self, record: &MatchRecord) {
        self.total_matches += 1;

        let mut match_points = 0;
        let mut has_climbed = false;
        for action in &record.actions {
            match action {
                ActionType::HighShotMade => {
                    match_points += HIGH_SHOT_POINTS;
                    self.high_hub_shots += 1;
                    self.successful_shots += 1;
                    self.total_shots += 1;
                }
                ActionType::HighShotMissed => {
                    self.high_hub_shots += 1;
                    self.total_shots += 1;
                }
                ActionType::LowShotMade => {
                    match_points += LOW_SHOT_POINTS;
                    self.low_hub_shots += 1;
                    self.successful_shots += 1;
                    self.total_shots += 1;
                }
                ActionType::LowShotMissed => {
                    self.low_hub_shots += 1;
                    self.total_shots += 1;
                }
                // Only the first climb of a match is credited
                ActionType::Climb(tier) if !has_climbed => {
                    has_climbed = true;
                    if let Some(tier) = tier {
                        match_points += tier.points();
                        self.total_climb_levels += tier.level();
                    }
                }
                ActionType::Climb(_) => {}
                ActionType::Other(label) => {
                    log::debug!("Ignoring action {} in match {}", label, record.id);
                }
            }
        }

        self.total_match_points += match_points;
    }

    fn build(self) -> DerivedStats {
        let averages = if self.total_matches > 0 {
            let matches = self.total_matches as f64;
            Some(MatchAverages {
                avg_low_hub_shots: self.low_hub_shots as f64 / matches,
                avg_high_hub_shots: self.high_hub_shots as f64 / matches,
                average_points_scored: self.total_match_points as f64 / matches,
                average_pieces_scored: self.successful_shots as f64 / matches,
                average_climb_level: self.total_climb_levels as f64 / matches,
            })
        } else {
            None
        };

        // With no attempts, accuracy is 0 and every shot is assumed high
        let (scouted_accuracy, high_hub_ratio) = if self.total_shots == 0 {
            (0.0, 1.0)
        } else {
            let shots = self.total_shots as f64;
            (
                self.successful_shots as f64 / shots,
                self.high_hub_shots as f64 / shots,
            )
        };

        DerivedStats {
            total_matches: self.total_matches,
            total_shots: self.total_shots,
            averages,
            scouted_accuracy,
            high_hub_ratio,
        }
    }
}
