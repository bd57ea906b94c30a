//! Scouting document store
//!
//! Team documents live at `2022/info/teams/{team}` with one document per
//! scouted match in the `matches` subcollection. Documents are read over the
//! Firestore REST API and decoded from its typed-value encoding into plain
//! JSON.

use crate::auth::{Authorizer, StoreAuth};
use crate::config::Config;
use crate::constants::*;
use crate::error::{Result, ScoutError};
use crate::models::{MatchRecord, StoredMatch, TeamId, TeamRecord};
use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Read access to stored scouting data
#[allow(async_fn_in_trait)]
pub trait ScoutingStore {
    /// The team's pit-scouting record, or `None` if the team was never scouted
    async fn team_record(&self, team: &TeamId) -> Result<Option<TeamRecord>>;

    /// The team's match records in storage order
    async fn match_records(&self, team: &TeamId) -> Result<Vec<MatchRecord>>;
}

/// Firestore REST client scoped to one project's default database
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    auth: Authorizer,
}

impl FirestoreStore {
    pub fn new(base_url: &str, project_id: &str, auth: StoreAuth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(FirestoreStore {
            auth: Authorizer::new(client.clone(), auth),
            client,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                base_url, project_id
            ),
        })
    }

    /// Build the store for `config` and obtain its first access token, so
    /// unusable credentials fail the run before any team is read
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = Self::new(
            &config.store_base_url,
            &config.project_id,
            config.store_auth.clone(),
        )?;
        if store.auth.bearer_token().await?.is_some() {
            log::info!("Authorised against project {}", config.project_id);
        }
        Ok(store)
    }

    /// GET a document path; `Ok(None)` on 404
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}/{}", self.documents_url, path);
        log::debug!("Making request to URL: {}", url);

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = self.auth.bearer_token().await? {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<T>().await?)),
            status => Err(ScoutError::Status { url, status }),
        }
    }
}

impl ScoutingStore for FirestoreStore {
    async fn team_record(&self, team: &TeamId) -> Result<Option<TeamRecord>> {
        let path = format!("{}/{}", TEAMS_COLLECTION, team.as_str());
        let document: Option<Document> = self.get(&path, &[]).await?;
        Ok(document.map(Document::into_json))
    }

    async fn match_records(&self, team: &TeamId) -> Result<Vec<MatchRecord>> {
        let path = format!("{}/{}/{}", TEAMS_COLLECTION, team.as_str(), MATCHES_COLLECTION);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", MATCH_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: ListDocuments = match self.get(&path, &query).await? {
                Some(page) => page,
                None => break,
            };
            for document in page.documents {
                records.push(document.into_match()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocuments {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl Document {
    /// Last segment of the resource name
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn into_json(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .map(|(key, value)| (key, value.into_json()))
            .collect()
    }

    fn into_match(self) -> Result<MatchRecord> {
        let id = self.id().to_string();
        let stored: StoredMatch =
            serde_json::from_value(Value::Object(self.into_json())).map_err(|source| {
                ScoutError::Decode {
                    what: format!("match {}", id),
                    source,
                }
            })?;
        Ok(MatchRecord::from_stored(id, stored))
    }
}

/// Firestore's typed value encoding, one variant key per value
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue(IgnoredAny),
    BooleanValue(bool),
    // 64-bit integers arrive as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl FirestoreValue {
    fn into_json(self) -> Value {
        match self {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            FirestoreValue::IntegerValue(s) => match s.parse::<i64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => Value::String(s),
            },
            FirestoreValue::DoubleValue(d) => {
                Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null)
            }
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(v) => v,
            FirestoreValue::ArrayValue(array) => {
                Value::Array(array.values.into_iter().map(FirestoreValue::into_json).collect())
            }
            FirestoreValue::MapValue(map) => Value::Object(
                map.fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect(),
            ),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::fake_google;
    use crate::config::Cli;
    use crate::models::{ActionType, ClimbTier};
    use clap::Parser;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_team_document_decodes_to_plain_json() {
        let document: Document = serde_json::from_value(json!({
            "name": "projects/scouting/databases/(default)/documents/2022/info/teams/254",
            "fields": {
                "accuracy": {"stringValue": "80%, mostly upper"},
                "autonBalls": {"integerValue": "3"},
                "badFalcons": {"booleanValue": false},
                "climbLocations": {"arrayValue": {"values": [
                    {"stringValue": "MID"},
                    {"stringValue": "HIGH"}
                ]}},
                "notes": {"nullValue": null},
                "weight": {"doubleValue": 118.5},
                "empty": {"arrayValue": {}},
                "drivetrain": {"mapValue": {"fields": {"motors": {"integerValue": "4"}}}}
            },
            "createTime": "2022-03-04T18:00:00Z",
            "updateTime": "2022-03-04T18:00:00Z"
        }))
        .unwrap();

        assert_eq!(document.id(), "254");
        let record = document.into_json();
        assert_eq!(record["accuracy"], json!("80%, mostly upper"));
        assert_eq!(record["autonBalls"], json!(3));
        assert_eq!(record["badFalcons"], json!(false));
        assert_eq!(record["climbLocations"], json!(["MID", "HIGH"]));
        assert_eq!(record["notes"], Value::Null);
        assert_eq!(record["weight"], json!(118.5));
        assert_eq!(record["empty"], json!([]));
        assert_eq!(record["drivetrain"], json!({"motors": 4}));
    }

    #[test]
    fn test_match_document_decodes() {
        let page: ListDocuments = serde_json::from_value(json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/2022/info/teams/254/matches/14",
                "fields": {
                    "matchType": {"stringValue": "QM"},
                    "actions": {"arrayValue": {"values": [
                        {"mapValue": {"fields": {
                            "actionType": {"stringValue": "SHOT_UPPER"},
                            "timestamp": {"integerValue": "1500"}
                        }}},
                        {"mapValue": {"fields": {
                            "actionType": {"stringValue": "CLIMB_HIGH"}
                        }}}
                    ]}}
                }
            }],
            "nextPageToken": "abc"
        }))
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        let record = page.documents.into_iter().next().unwrap().into_match().unwrap();
        assert_eq!(record.id, "14");
        assert_eq!(record.match_type, "QM");
        assert_eq!(
            record.actions,
            vec![ActionType::HighShotMade, ActionType::Climb(Some(ClimbTier::High))]
        );
    }

    #[test]
    fn test_empty_collection_page() {
        let page: ListDocuments = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_match_with_malformed_actions_is_a_decode_error() {
        let document: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/2022/info/teams/254/matches/3",
            "fields": {
                "actions": {"arrayValue": {"values": [{"stringValue": "SHOT_UPPER"}]}}
            }
        }))
        .unwrap();
        assert!(matches!(document.into_match(), Err(ScoutError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_store_from_config_sends_minted_token() {
        let google = fake_google::serve().await;
        let dir = tempfile::tempdir().unwrap();
        let creds = dir.path().join("creds.json");
        fs::write(&creds, google.service_account_json()).unwrap();

        let cli = Cli::try_parse_from([
            "scouting_report",
            "2022cada",
            "--creds",
            creds.to_str().unwrap(),
        ])
        .unwrap();
        let mut config = Config::from_vars(cli, |name| {
            (name == AUTH_KEY_VAR).then(|| "tba-key".to_string())
        })
        .unwrap();
        config.store_base_url = format!("{}/v1", google.base_url);

        let store = FirestoreStore::connect(&config).await.unwrap();
        let record = store.team_record(&TeamId::from("254")).await.unwrap().unwrap();
        assert_eq!(record["features"], json!("turret"));
        assert!(store.match_records(&TeamId::from("254")).await.unwrap().is_empty());
        assert_eq!(google.token_requests(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_store_is_refused() {
        let google = fake_google::serve().await;
        let base_url = format!("{}/v1", google.base_url);
        let store = FirestoreStore::new(&base_url, "scouting-2022", StoreAuth::Emulator).unwrap();

        let result = store.team_record(&TeamId::from("254")).await;
        assert!(matches!(
            result,
            Err(ScoutError::Status { status: StatusCode::FORBIDDEN, .. })
        ));
    }
}
