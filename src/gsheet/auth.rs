// ABOUTME: Service-account authentication for the Google Sheets API.
// ABOUTME: Signs an RS256 JWT and exchanges it for a cached bearer token.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::SheetsApiError;

/// OAuth scopes requested for the service account.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account credential file this crate uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    /// Parse and validate a credential file's contents.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let account: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        if account.client_email.trim().is_empty() {
            return Err("client_email is empty".into());
        }
        account.signing_key()?;
        Ok(account)
    }

    fn signing_key(&self) -> Result<EncodingKey, String> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| format!("private_key is not a valid RSA PEM key: {}", e))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct AccessToken {
    value: String,
    expires_at: i64,
}

/// Issues bearer tokens for a service account, reusing one until it nears expiry.
pub struct TokenSource {
    account: ServiceAccount,
    key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    /// Create a token source. Fails if the private key cannot be parsed.
    pub fn new(account: ServiceAccount, http: reqwest::Client) -> Result<Self, SheetsApiError> {
        let key = account.signing_key().map_err(SheetsApiError::Auth)?;
        Ok(Self {
            account,
            key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// The service account's email address.
    pub fn client_email(&self) -> &str {
        &self.account.client_email
    }

    /// Return a valid access token, fetching a new one when needed.
    pub async fn token(&self) -> Result<String, SheetsApiError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPES.join(" "),
            aud: &self.account.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| SheetsApiError::Auth(format!("failed to sign token request: {}", e)))?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsApiError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!(account = %self.account.client_email, "obtained Google access token");

        let value = body.access_token;
        *cached = Some(AccessToken {
            value: value.clone(),
            expires_at: now + body.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        });
        Ok(value)
    }
}
