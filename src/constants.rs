// Roster API
pub const API_BASE_URL: &str = "https://www.thebluealliance.com/api/v3";
pub const AUTH_HEADER: &str = "X-TBA-Auth-Key";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
// Team keys look like "frc254"
pub const TEAM_KEY_PREFIX_LEN: usize = 3;

// Scouting store
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const TEAMS_COLLECTION: &str = "2022/info/teams";
pub const MATCHES_COLLECTION: &str = "matches";
pub const MATCH_PAGE_SIZE: u32 = 300;

// Environment
pub const AUTH_KEY_VAR: &str = "TBA_AUTH_KEY";
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_ACCESS_TOKEN";
pub const EMULATOR_HOST_VAR: &str = "FIRESTORE_EMULATOR_HOST";
pub const DEFAULT_CREDS_PATH: &str = "creds.json";

// Report
pub const CSV_HEADER: [&str; 17] = [
    "team",
    "quoted accuracy",
    "auton balls",
    "auton routine",
    "using bad falcons",
    "climb levels",
    "drivebase type",
    "driver experience",
    "features",
    "average low hub shots",
    "average high hub shots",
    "scouted accuracy",
    "average climb level",
    "average pieces scored",
    "high hub ratio",
    "average points scored",
    "total matches",
];

// Scoring
pub const HIGH_SHOT_POINTS: u32 = 2;
pub const LOW_SHOT_POINTS: u32 = 1;
