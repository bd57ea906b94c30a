//! Access tokens for the scouting store
//!
//! Requests are authorised with an OAuth bearer token minted from the
//! service-account key: a signed RS256 assertion is exchanged at the key's
//! `token_uri` and the resulting token is reused until shortly before it
//! expires.

use crate::config::ServiceAccount;
use crate::error::{Result, ScoutError};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECONDS: u64 = 3600;
const REFRESH_MARGIN_SECONDS: u64 = 60;

/// How store requests are authorised
#[derive(Debug, Clone)]
pub enum StoreAuth {
    /// Fixed bearer token supplied by the environment
    Token(String),
    /// Local emulator; requests carry no credentials
    Emulator,
    /// Tokens minted from the service-account key
    ServiceAccount(ServiceAccount),
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: u64,
}

pub struct Authorizer {
    client: Client,
    auth: StoreAuth,
    cached: Mutex<Option<CachedToken>>,
}

impl Authorizer {
    pub fn new(client: Client, auth: StoreAuth) -> Self {
        Authorizer {
            client,
            auth,
            cached: Mutex::new(None),
        }
    }

    /// Bearer token for the next request, `None` when talking to the emulator
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        let account = match &self.auth {
            StoreAuth::Token(token) => return Ok(Some(token.clone())),
            StoreAuth::Emulator => return Ok(None),
            StoreAuth::ServiceAccount(account) => account,
        };

        let now = jsonwebtoken::get_current_timestamp();
        if let Some(token) = self.cached_token(now) {
            return Ok(Some(token));
        }

        let token = self.mint(account, now).await?;
        let value = token.value.clone();
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(token);
        }
        Ok(Some(value))
    }

    fn cached_token(&self, now: u64) -> Option<String> {
        let cached = self.cached.lock().ok()?;
        cached
            .as_ref()
            .filter(|token| token.expires_at > now + REFRESH_MARGIN_SECONDS)
            .map(|token| token.value.clone())
    }

    async fn mint(&self, account: &ServiceAccount, now: u64) -> Result<CachedToken> {
        let (email, private_key) = match (&account.client_email, &account.private_key) {
            (Some(email), Some(key)) => (email, key),
            _ => {
                return Err(ScoutError::Auth(
                    "credentials need client_email and private_key".to_string(),
                ))
            }
        };

        let claims = Claims {
            iss: email,
            scope: DATASTORE_SCOPE,
            aud: &account.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECONDS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = account.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&header, &claims, &key)?;

        log::debug!("Requesting access token for {}", email);
        let response = self
            .client
            .post(&account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ScoutError::Status {
                url: account.token_uri.clone(),
                status: response.status(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECONDS),
        })
    }
}
