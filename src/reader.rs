// src/reader.rs

use anyhow::Context;
use std::{fmt, io};
use tracing::{info, instrument};

use crate::config::ReaderConfig;
use crate::error::{Result, SheetError};
use crate::sheets::{a1, Session};

/// What a run found: the spreadsheet's tabs and the values read.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub spreadsheet_title: String,
    pub worksheets: Vec<String>,
    /// A1 notation of the range requested, before grid clamping.
    pub range: String,
    pub heading: String,
    pub values: Vec<String>,
}

impl Report {
    /// `Worksheets found:` and one `- title` line per tab.
    pub fn write_listing(f: &mut impl fmt::Write, worksheets: &[String]) -> fmt::Result {
        writeln!(f, "Worksheets found:")?;
        for title in worksheets {
            writeln!(f, "- {title}")?;
        }
        Ok(())
    }

    /// A blank line, the heading, then one value per line.
    pub fn write_values(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}:", self.heading)?;
        for value in &self.values {
            writeln!(f, "{value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_listing(f, &self.worksheets)?;
        self.write_values(f)
    }
}

/// Drives authenticate → open → list → read from a [`ReaderConfig`].
#[derive(Debug, Clone)]
pub struct SheetReader {
    config: ReaderConfig,
}

impl SheetReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn authenticate(&self) -> Result<Session> {
        let options = self.config.session_options()?;
        Session::authenticate_with(&self.config.credential_path, &options)
    }

    pub fn run(&self) -> Result<Report> {
        let session = self.authenticate()?;
        self.run_with(&session)
    }

    pub fn run_with(&self, session: &Session) -> Result<Report> {
        self.run_to(session, &mut io::sink())
    }

    /// Like [`SheetReader::run_with`], printing to `out` as it goes: the
    /// worksheet listing is written as soon as the spreadsheet is open, so it
    /// appears even when the worksheet lookup then fails.
    #[instrument(level = "info", skip_all, fields(worksheet = %self.config.worksheet_title))]
    pub fn run_to(&self, session: &Session, out: &mut impl io::Write) -> Result<Report> {
        let cfg = &self.config;
        let spreadsheet = session.open_by_url(&cfg.spreadsheet_url)?;
        let worksheets: Vec<String> = spreadsheet
            .worksheet_titles()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut listing = String::new();
        Report::write_listing(&mut listing, &worksheets).context("formatting worksheet list")?;
        out.write_all(listing.as_bytes())
            .and_then(|_| out.flush())
            .context("writing worksheet list")?;

        let worksheet = spreadsheet.worksheet(&cfg.worksheet_title)?;
        let values =
            worksheet.read_column_range(cfg.column_index, cfg.first_row, cfg.max_row)?;
        info!(values = values.len(), "read column");

        let range = a1::column_range(
            &cfg.worksheet_title,
            cfg.column_index,
            cfg.first_row,
            cfg.max_row,
        )
        .unwrap_or_default();

        let report = Report {
            spreadsheet_title: spreadsheet.title().to_owned(),
            worksheets,
            range,
            heading: cfg.heading.clone(),
            values,
        };
        let mut section = String::new();
        report.write_values(&mut section).context("formatting values")?;
        out.write_all(section.as_bytes())
            .and_then(|_| out.flush())
            .context("writing values")?;
        Ok(report)
    }
}

/// The one-line console message for a failed run.
pub fn failure_message(err: &SheetError, config: &ReaderConfig) -> String {
    match err {
        SheetError::Authentication(reason) => format!(
            "Error: could not authenticate with {}: {reason}",
            config.credential_path.display()
        ),
        SheetError::SpreadsheetNotFound { url, reason } => {
            format!("Error: Spreadsheet not found at {url} ({reason})")
        }
        SheetError::WorksheetNotFound { title, available } => format!(
            "Error: '{title}' worksheet not found. Please check the exact worksheet name \
             (available: {}).",
            available.join(", ")
        ),
        SheetError::Unclassified(e) => format!("An unexpected error occurred: {e:#}"),
    }
}
