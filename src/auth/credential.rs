// src/auth/credential.rs

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};
use tracing::debug;
use url::Url;

use crate::error::{Result, SheetError};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each signed assertion; Google caps it at one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

/// The fields we need out of a Google service-account JSON key.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// JWT claims for the OAuth 2.0 JWT-bearer grant.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A parsed, validated service-account key with its RSA signing key ready.
#[derive(Clone)]
pub struct Credential {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    token_uri: Url,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("token_uri", &self.token_uri.as_str())
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Load a service-account key from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            SheetError::Authentication(format!(
                "reading credential file {}: {e}",
                path.display()
            ))
        })?;
        let cred = Self::from_json(&raw)?;
        debug!(path = %path.display(), client_email = %cred.client_email(), "loaded credential");
        Ok(cred)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| SheetError::Authentication(format!("malformed credential: {e}")))?;

        if key.key_type != "service_account" {
            return Err(SheetError::Authentication(format!(
                "expected a service_account key, got {:?}",
                key.key_type
            )));
        }
        if key.client_email.trim().is_empty() {
            return Err(SheetError::Authentication(
                "credential has an empty client_email".into(),
            ));
        }

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Authentication(format!("invalid private key: {e}")))?;

        let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        let token_uri = Url::parse(token_uri).map_err(|e| {
            SheetError::Authentication(format!("invalid token_uri {token_uri:?}: {e}"))
        })?;

        Ok(Self {
            key,
            signing_key,
            token_uri,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    pub fn token_uri(&self) -> &Url {
        &self.token_uri
    }

    /// Sign a JWT-bearer assertion for `scope`, issued at `now`.
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: scope.to_owned(),
            aud: self.token_uri.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| SheetError::Authentication(format!("signing assertion: {e}")))
    }
}
