// src/auth/token.rs

use chrono::{DateTime, Duration, Utc};
use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use std::cell::RefCell;
use tracing::{debug, info, instrument};

use super::Credential;
use crate::error::{Result, SheetError};

pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Used when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Interpret a token endpoint reply.
///
/// A 4xx means the credential was refused, except 429, which is a quota limit.
/// Quota limits and every other failure are transport or service faults.
pub fn parse_token_response(
    status: StatusCode,
    body: &str,
    now: DateTime<Utc>,
) -> Result<AccessToken> {
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        let reason = match serde_json::from_str::<TokenErrorResponse>(body) {
            Ok(TokenErrorResponse {
                error,
                error_description: Some(desc),
            }) => format!("{error}: {desc}"),
            Ok(TokenErrorResponse { error, .. }) => error,
            Err(_) => format!("token endpoint returned {status}"),
        };
        return Err(SheetError::Authentication(reason));
    }
    if !status.is_success() {
        return Err(SheetError::unclassified(format!(
            "token endpoint returned {status}"
        )));
    }

    let resp: TokenResponse = serde_json::from_str(body)
        .map_err(|e| SheetError::unclassified(format!("malformed token response: {e}")))?;
    if resp.access_token.is_empty() {
        return Err(SheetError::Authentication(
            "token endpoint returned an empty access_token".into(),
        ));
    }
    let ttl = resp.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    Ok(AccessToken {
        value: resp.access_token,
        expires_at: now + Duration::seconds(ttl),
    })
}

/// Exchanges signed assertions for access tokens and keeps the current one
/// until it is about to expire.
#[derive(Debug)]
pub struct TokenProvider {
    credential: Credential,
    scope: String,
    current: RefCell<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(credential: Credential, scope: impl Into<String>) -> Self {
        Self {
            credential,
            scope: scope.into(),
            current: RefCell::new(None),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// A bearer token valid for at least the expiry margin.
    pub fn token(&self, client: &Client) -> Result<String> {
        let now = Utc::now();
        if let Some(tok) = self.current.borrow().as_ref() {
            if tok.is_fresh(now) {
                return Ok(tok.value.clone());
            }
        }
        let tok = self.fetch(client, now)?;
        let value = tok.value.clone();
        *self.current.borrow_mut() = Some(tok);
        Ok(value)
    }

    #[instrument(level = "debug", skip(self, client), fields(client_email = %self.credential.client_email()))]
    fn fetch(&self, client: &Client, now: DateTime<Utc>) -> Result<AccessToken> {
        let assertion = self.credential.assertion(&self.scope, now)?;
        let uri = self.credential.token_uri().clone();
        debug!(%uri, "requesting access token");

        let resp = client
            .post(uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;
        let status = resp.status();
        let body = resp.text()?;

        let tok = parse_token_response(status, &body, now)?;
        info!(expires_at = %tok.expires_at, "authenticated");
        Ok(tok)
    }
}
