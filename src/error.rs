// src/error.rs

use std::process::ExitCode;

/// Every failure the accessor can report, one variant per kind so callers can
/// match on it instead of on message text.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Credential file missing, malformed, or rejected by the token endpoint.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The URL has no spreadsheet key, or the key is unknown or not shared
    /// with the service account (the service reports both the same way).
    #[error("spreadsheet not found at {url}: {reason}")]
    SpreadsheetNotFound { url: String, reason: String },

    #[error("worksheet {title:?} not found (available: {})", .available.join(", "))]
    WorksheetNotFound {
        title: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;

/// Coarse classification of a [`SheetError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    SpreadsheetNotFound,
    WorksheetNotFound,
    Unclassified,
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::SpreadsheetNotFound => "spreadsheet_not_found",
            ErrorKind::WorksheetNotFound => "worksheet_not_found",
            ErrorKind::Unclassified => "unclassified",
        }
    }

    /// Process exit status for this kind. `2` is left to usage/config errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Unclassified => 1,
            ErrorKind::Authentication => 3,
            ErrorKind::SpreadsheetNotFound => 4,
            ErrorKind::WorksheetNotFound => 5,
        }
    }
}

impl SheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::Authentication(_) => ErrorKind::Authentication,
            SheetError::SpreadsheetNotFound { .. } => ErrorKind::SpreadsheetNotFound,
            SheetError::WorksheetNotFound { .. } => ErrorKind::WorksheetNotFound,
            SheetError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.kind().exit_code())
    }

    pub(crate) fn unclassified(msg: impl std::fmt::Display) -> Self {
        SheetError::Unclassified(anyhow::anyhow!("{msg}"))
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        SheetError::Unclassified(anyhow::Error::new(e).context("HTTP request failed"))
    }
}
