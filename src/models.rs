use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Bare team number as used for store keys ("254", not "frc254")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        TeamId(s.to_string())
    }
}

/// Pit-scouting fields stored for a team, keyed by field name
pub type TeamRecord = Map<String, Value>;

/// Entry of the roster API's `/teams/simple` listing
#[derive(Debug, Deserialize)]
pub struct ApiTeam {
    pub key: String,
}

/// Match document as stored under a team, before action labels are parsed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatch {
    #[serde(default)]
    pub match_type: String,
    #[serde(default)]
    pub actions: Vec<StoredAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAction {
    pub action_type: String,
}

/// One scouted match with its actions in recorded order
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: String,
    pub match_type: String,
    pub actions: Vec<ActionType>,
}

impl MatchRecord {
    pub fn from_stored(id: String, stored: StoredMatch) -> Self {
        MatchRecord {
            id,
            match_type: stored.match_type,
            actions: stored
                .actions
                .iter()
                .map(|a| ActionType::from_label(&a.action_type))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbTier {
    Low,
    Mid,
    High,
    Traversal,
}

// Labels the scouting app emits for climbs
const CLIMB_LABELS: [(&str, ClimbTier); 4] = [
    ("CLIMB_LOW", ClimbTier::Low),
    ("CLIMB_MID", ClimbTier::Mid),
    ("CLIMB_HIGH", ClimbTier::High),
    ("CLIMB_TRAVERSAL", ClimbTier::Traversal),
];

// Any other climb label is resolved by the first tier name it contains,
// checked in this order.
const CLIMB_FALLBACK: [(&str, ClimbTier); 4] = [
    ("LOW", ClimbTier::Low),
    ("MID", ClimbTier::Mid),
    ("HIGH", ClimbTier::High),
    ("TRAVERSAL", ClimbTier::Traversal),
];

impl ClimbTier {
    pub fn points(self) -> u32 {
        match self {
            ClimbTier::Low => 4,
            ClimbTier::Mid => 6,
            ClimbTier::High => 10,
            ClimbTier::Traversal => 15,
        }
    }

    /// Weight used for the average climb level (1 = low .. 4 = traversal)
    pub fn level(self) -> u32 {
        match self {
            ClimbTier::Low => 1,
            ClimbTier::Mid => 2,
            ClimbTier::High => 3,
            ClimbTier::Traversal => 4,
        }
    }

    fn from_climb_label(label: &str) -> Option<Self> {
        CLIMB_LABELS
            .iter()
            .find(|(name, _)| *name == label)
            .or_else(|| CLIMB_FALLBACK.iter().find(|(name, _)| label.contains(name)))
            .map(|(_, tier)| *tier)
    }
}

/// Scouted action within a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionType {
    HighShotMade,
    HighShotMissed,
    LowShotMade,
    LowShotMissed,
    /// A climb attempt; `None` when the label names no tier
    Climb(Option<ClimbTier>),
    Other(String),
}

impl ActionType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "SHOT_UPPER" => ActionType::HighShotMade,
            "MISSED_UPPER" => ActionType::HighShotMissed,
            "SHOT_LOWER" => ActionType::LowShotMade,
            "MISSED_LOWER" => ActionType::LowShotMissed,
            _ if label.contains("CLIMB") => ActionType::Climb(ClimbTier::from_climb_label(label)),
            _ => ActionType::Other(label.to_string()),
        }
    }
}

/// Per-match averages, only defined once a team has at least one match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchAverages {
    pub avg_low_hub_shots: f64,
    pub avg_high_hub_shots: f64,
    pub average_points_scored: f64,
    pub average_pieces_scored: f64,
    pub average_climb_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub total_matches: u32,
    pub total_shots: u32,
    pub averages: Option<MatchAverages>,
    pub scouted_accuracy: f64,
    pub high_hub_ratio: f64,
}

/// Team record enriched with statistics derived from its matches
#[derive(Debug, Clone)]
pub struct ScoutedTeam {
    pub team: TeamId,
    pub record: TeamRecord,
    pub stats: DerivedStats,
}
