// src/sheets/http.rs

use anyhow::Context;
use reqwest::{blocking::Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::api::{ApiErrorBody, SheetsApi, SpreadsheetMetadata, ValueRange};
use crate::auth::TokenProvider;
use crate::error::{Result, SheetError};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/";

const METADATA_FIELDS: &str = "spreadsheetId,properties.title,\
     sheets.properties(sheetId,title,index,gridProperties(rowCount,columnCount))";

/// Sheets API v4 over blocking HTTP.
#[derive(Debug)]
pub struct HttpSheetsApi {
    client: Client,
    base: Url,
    tokens: TokenProvider,
}

impl HttpSheetsApi {
    pub fn new(tokens: TokenProvider, base: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sheetreader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base,
            tokens,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetError::unclassified(format!("API base {} has no path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        spreadsheet_id: &str,
    ) -> Result<T> {
        let token = self.tokens.token(&self.client)?;
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .query(query)
            .send()?;

        let status = resp.status();
        let body = resp.text().with_context(|| format!("reading body from {url}"))?;
        if !status.is_success() {
            warn!(%status, spreadsheet_id, "Sheets API request failed");
            return Err(classify_failure(status, &body, spreadsheet_id));
        }
        Ok(serde_json::from_str(&body).with_context(|| format!("decoding response from {url}"))?)
    }
}

impl SheetsApi for HttpSheetsApi {
    #[instrument(level = "debug", skip(self))]
    fn spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        let url = self.endpoint(["spreadsheets", spreadsheet_id])?;
        self.get_json(url, &[("fields", METADATA_FIELDS)], spreadsheet_id)
    }

    #[instrument(level = "debug", skip(self))]
    fn column_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = self.endpoint(["spreadsheets", spreadsheet_id, "values", range])?;
        self.get_json(
            url,
            &[
                ("majorDimension", "COLUMNS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ],
            spreadsheet_id,
        )
    }
}

/// Map a non-success Sheets API reply onto the error taxonomy.
///
/// The service answers 403 for spreadsheets not shared with the caller and
/// 404 for unknown keys; both are reported as not found.
pub fn classify_failure(status: StatusCode, body: &str, spreadsheet_id: &str) -> SheetError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error }) => match error.status {
            Some(s) if !error.message.is_empty() => format!("{s}: {}", error.message),
            Some(s) => s,
            None => error.message,
        },
        Err(_) => String::new(),
    };
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    match status {
        StatusCode::UNAUTHORIZED => SheetError::Authentication(message),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => SheetError::SpreadsheetNotFound {
            url: spreadsheet_id.to_owned(),
            reason: message,
        },
        _ => SheetError::unclassified(format!("Sheets API returned {status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, SPREADSHEETS_READONLY_SCOPE};
    use crate::error::ErrorKind;

    fn api(base: &str) -> HttpSheetsApi {
        let cred = Credential::from_json(&crate::auth::credential::tests::key_json()).unwrap();
        HttpSheetsApi::new(
            TokenProvider::new(cred, SPREADSHEETS_READONLY_SCOPE),
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_encodes_range() {
        let api = api(DEFAULT_API_BASE);
        let url = api
            .endpoint(["spreadsheets", "abc", "values", "'My List'!A2:A1000"])
            .unwrap();
        assert!(url
            .as_str()
            .starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc/values/"));
        assert!(!url.path().contains(' '));
        assert_eq!(url.path_segments().unwrap().count(), 5);
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let api = api("http://localhost:8080/v4");
        let url = api.endpoint(["spreadsheets", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v4/spreadsheets/abc");
    }

    #[test]
    fn test_classify_failure() {
        let not_found = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let err = classify_failure(StatusCode::NOT_FOUND, not_found, "abc");
        assert_eq!(err.kind(), ErrorKind::SpreadsheetNotFound);
        assert!(err.to_string().contains("NOT_FOUND: Requested entity was not found."));

        let err = classify_failure(StatusCode::FORBIDDEN, "", "abc");
        assert_eq!(err.kind(), ErrorKind::SpreadsheetNotFound);

        let err = classify_failure(StatusCode::UNAUTHORIZED, "", "abc");
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "quota", "abc");
        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert!(err.to_string().contains("429"));
    }
}
