use crate::auth::StoreAuth;
use crate::constants::*;
use crate::error::{Result, ScoutError};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "scouting_report")]
#[command(about = "Analyze results from match scouting", long_about = None)]
pub struct Cli {
    /// Event code, e.g. 2022cada
    pub eventcode: String,

    /// Service account file for the scouting database
    #[arg(long, default_value = DEFAULT_CREDS_PATH)]
    pub creds: PathBuf,

    /// Report path (defaults to <eventcode>.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Statistic written to the "average points scored" column
    #[arg(long, value_enum, default_value_t = PointsColumn::Pieces)]
    pub points_column: PointsColumn,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PointsColumn {
    /// Average pieces scored, as earlier reports did
    Pieces,
    /// Average points scored
    Points,
}

/// Service-account key file (`creds.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ServiceAccount {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::Config(format!("Failed to read credentials {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|source| ScoutError::Decode {
            what: format!("credentials {}", path.display()),
            source,
        })
    }
}

#[derive(Debug)]
pub struct Config {
    pub event_code: String,
    pub output: PathBuf,
    pub points_column: PointsColumn,
    pub tba_auth_key: String,
    pub project_id: String,
    pub store_base_url: String,
    pub store_auth: StoreAuth,
}

impl Config {
    /// Combine command-line options with the environment (after `.env` is loaded)
    pub fn from_env(cli: Cli) -> Result<Self> {
        Self::from_vars(cli, |name| env::var(name).ok())
    }

    /// Build from command-line options and a variable lookup. Store
    /// credentials come from, in order: a fixed access token, the
    /// emulator (no credentials), the service-account key.
    pub fn from_vars<F>(cli: Cli, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| var(name).filter(|value| !value.is_empty());

        let tba_auth_key = set(AUTH_KEY_VAR)
            .ok_or_else(|| ScoutError::Config(format!("{} must be set", AUTH_KEY_VAR)))?;
        let account = ServiceAccount::load(&cli.creds)?;
        let emulator_host = set(EMULATOR_HOST_VAR);

        let store_base_url = match &emulator_host {
            Some(host) => format!("http://{}/v1", host),
            None => FIRESTORE_BASE_URL.to_string(),
        };
        let project_id = account.project_id.clone();
        let store_auth = match (set(ACCESS_TOKEN_VAR), emulator_host) {
            (Some(token), _) => StoreAuth::Token(token),
            (None, Some(_)) => StoreAuth::Emulator,
            (None, None) => {
                if let Some(email) = &account.client_email {
                    log::debug!("Using service account {}", email);
                }
                StoreAuth::ServiceAccount(account)
            }
        };

        Ok(Config {
            output: cli
                .output
                .unwrap_or_else(|| PathBuf::from(format!("{}.csv", cli.eventcode))),
            event_code: cli.eventcode,
            points_column: cli.points_column,
            tba_auth_key,
            project_id,
            store_base_url,
            store_auth,
        })
    }
}
