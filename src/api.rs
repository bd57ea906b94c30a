use crate::constants::*;
use crate::error::{Result, ScoutError};
use crate::models::{ApiTeam, TeamId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Source of the teams registered for an event
#[allow(async_fn_in_trait)]
pub trait RosterSource {
    /// Team ids in the order the source lists them. An empty roster is `Ok(vec![])`.
    async fn event_teams(&self, event_code: &str) -> Result<Vec<TeamId>>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(ApiClient {
            client,
            base_url,
            api_key,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        log::debug!("Making request to URL: {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_key)
            .send()
            .await?;

        log::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ScoutError::Status {
                url,
                status: response.status(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn get_event_teams(&self, event_code: &str) -> Result<Vec<ApiTeam>> {
        let endpoint = format!("/event/{}/teams/simple", event_code);
        self.get(&endpoint).await
    }
}

impl RosterSource for ApiClient {
    async fn event_teams(&self, event_code: &str) -> Result<Vec<TeamId>> {
        let teams = self.get_event_teams(event_code).await?;
        Ok(team_ids_from_keys(teams.iter().map(|t| t.key.as_str())))
    }
}

/// Strip the league prefix from team keys ("frc254" -> "254")
pub fn team_ids_from_keys<'a, I>(keys: I) -> Vec<TeamId>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter_map(|key| match key.get(TEAM_KEY_PREFIX_LEN..) {
            Some(number) if !number.is_empty() => Some(TeamId(number.to_string())),
            _ => {
                log::warn!("Ignoring malformed team key {:?}", key);
                None
            }
        })
        .collect()
}

/// Fetch the roster, falling back to an empty list when the lookup fails
pub async fn list_teams<R: RosterSource>(source: &R, event_code: &str) -> Vec<TeamId> {
    match source.event_teams(event_code).await {
        Ok(teams) => {
            log::info!("Found {} teams at {}", teams.len(), event_code);
            teams
        }
        Err(e) => {
            log::warn!("Roster lookup for {} failed: {}", event_code, e);
            Vec::new()
        }
    }
}
