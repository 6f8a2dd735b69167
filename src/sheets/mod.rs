// src/sheets/mod.rs

pub mod a1;
pub mod api;
pub mod http;
#[cfg(test)]
pub(crate) mod memory;

use std::{path::Path, time::Duration};
use tracing::{debug, info, instrument};
use url::Url;

pub use api::SheetsApi;
pub use http::{HttpSheetsApi, DEFAULT_API_BASE};

use crate::auth::{Credential, TokenProvider, SPREADSHEETS_READONLY_SCOPE};
use crate::error::{Result, SheetError};

/// Row 1 holds column headers.
pub const FIRST_DATA_ROW: u32 = 2;

/// Transport settings for [`Session::authenticate_with`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub api_base: Url,
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base should parse"),
            timeout: Duration::from_secs(30),
        }
    }
}

/// An authenticated handle to the spreadsheet service.
pub struct Session {
    api: Box<dyn SheetsApi>,
}

impl Session {
    /// Load the service-account key at `credential_path` and build a session
    /// with default transport settings.
    ///
    /// The key is parsed and validated here; the token exchange is deferred
    /// to the first remote call.
    pub fn authenticate(credential_path: impl AsRef<Path>) -> Result<Self> {
        Self::authenticate_with(credential_path, &SessionOptions::default())
    }

    #[instrument(level = "info", skip_all, fields(path = %credential_path.as_ref().display()))]
    pub fn authenticate_with(
        credential_path: impl AsRef<Path>,
        options: &SessionOptions,
    ) -> Result<Self> {
        let credential = Credential::from_file(credential_path)?;
        info!(client_email = %credential.client_email(), "credential loaded");
        let tokens = TokenProvider::new(credential, SPREADSHEETS_READONLY_SCOPE);
        let api = HttpSheetsApi::new(tokens, options.api_base.clone(), options.timeout)?;
        Ok(Self::from_api(api))
    }

    /// Wrap an existing transport.
    pub fn from_api(api: impl SheetsApi + 'static) -> Self {
        Self { api: Box::new(api) }
    }

    /// Resolve a spreadsheet from its browser URL.
    #[instrument(level = "info", skip(self))]
    pub fn open_by_url(&self, url: &str) -> Result<Spreadsheet<'_>> {
        let id = a1::spreadsheet_id_from_url(url).ok_or_else(|| {
            SheetError::SpreadsheetNotFound {
                url: url.to_owned(),
                reason: "no spreadsheet key in URL".into(),
            }
        })?;
        self.open_by_key(&id).map_err(|e| with_url(e, url))
    }

    /// Resolve a spreadsheet from its key.
    pub fn open_by_key(&self, id: &str) -> Result<Spreadsheet<'_>> {
        let meta = self.api.spreadsheet(id)?;
        let worksheets: Vec<WorksheetInfo> = meta
            .sheets
            .into_iter()
            .map(|s| WorksheetInfo {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
                index: s.properties.index,
                grid: s.properties.grid_properties.map(|g| GridSize {
                    rows: g.row_count,
                    columns: g.column_count,
                }),
            })
            .collect();
        info!(
            spreadsheet_id = id,
            title = %meta.properties.title,
            worksheets = worksheets.len(),
            "opened spreadsheet"
        );
        Ok(Spreadsheet {
            session: self,
            id: id.to_owned(),
            title: meta.properties.title,
            worksheets,
        })
    }
}

fn with_url(err: SheetError, url: &str) -> SheetError {
    match err {
        SheetError::SpreadsheetNotFound { reason, .. } => SheetError::SpreadsheetNotFound {
            url: url.to_owned(),
            reason,
        },
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: u32,
    pub columns: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetInfo {
    pub sheet_id: i64,
    pub title: String,
    pub index: u32,
    /// `None` for object sheets, which have no cell grid.
    pub grid: Option<GridSize>,
}

/// A spreadsheet resolved through a [`Session`].
pub struct Spreadsheet<'s> {
    session: &'s Session,
    id: String,
    title: String,
    worksheets: Vec<WorksheetInfo>,
}

impl<'s> Spreadsheet<'s> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn worksheets(&self) -> &[WorksheetInfo] {
        &self.worksheets
    }

    /// Titles in the spreadsheet's own tab order.
    pub fn worksheet_titles(&self) -> Vec<&str> {
        self.worksheets.iter().map(|w| w.title.as_str()).collect()
    }

    /// Look up a worksheet by exact, case-sensitive title.
    pub fn worksheet(&self, title: &str) -> Result<Worksheet<'_>> {
        let info = self
            .worksheets
            .iter()
            .find(|w| w.title == title)
            .ok_or_else(|| SheetError::WorksheetNotFound {
                title: title.to_owned(),
                available: self.worksheets.iter().map(|w| w.title.clone()).collect(),
            })?;
        Ok(Worksheet {
            spreadsheet: self,
            info,
        })
    }
}

/// A non-empty cell and the row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub value: String,
}

/// A worksheet of the spreadsheet it was resolved from.
pub struct Worksheet<'a> {
    spreadsheet: &'a Spreadsheet<'a>,
    info: &'a WorksheetInfo,
}

impl<'a> Worksheet<'a> {
    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn info(&self) -> &WorksheetInfo {
        self.info
    }

    /// Non-empty values of `column` (1-based) from the first data row through
    /// `max_row` inclusive.
    pub fn read_column(&self, column: u32, max_row: u32) -> Result<Vec<String>> {
        self.read_column_range(column, FIRST_DATA_ROW, max_row)
    }

    pub fn read_column_range(
        &self,
        column: u32,
        first_row: u32,
        max_row: u32,
    ) -> Result<Vec<String>> {
        Ok(self
            .read_column_cells(column, first_row, max_row)?
            .into_iter()
            .map(|c| c.value)
            .collect())
    }

    /// Like [`Worksheet::read_column_range`] but keeps each value's row.
    ///
    /// Blank cells are dropped. Columns past the grid read as empty; `max_row`
    /// is clamped to the grid height. Sheets with no grid read as empty.
    #[instrument(level = "debug", skip(self), fields(worksheet = %self.info.title))]
    pub fn read_column_cells(
        &self,
        column: u32,
        first_row: u32,
        max_row: u32,
    ) -> Result<Vec<Cell>> {
        if column == 0 || first_row == 0 {
            return Err(SheetError::unclassified(format!(
                "invalid range: column {column}, first row {first_row} (both are 1-based)"
            )));
        }

        let mut last_row = max_row;
        match self.info.grid {
            Some(grid) if column > grid.columns => {
                debug!(column, columns = grid.columns, "column outside grid");
                return Ok(Vec::new());
            }
            Some(grid) => last_row = last_row.min(grid.rows),
            None => {
                debug!(title = %self.info.title, "worksheet has no grid");
                return Ok(Vec::new());
            }
        }
        if first_row > last_row {
            return Ok(Vec::new());
        }

        let range = a1::column_range(&self.info.title, column, first_row, last_row)
            .ok_or_else(|| SheetError::unclassified(format!("invalid column {column}")))?;
        let values = self
            .spreadsheet
            .session
            .api
            .column_values(&self.spreadsheet.id, &range)?
            .first_column();

        let cells: Vec<Cell> = (first_row..=last_row)
            .zip(values)
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(row, value)| Cell { row, value })
            .collect();
        debug!(%range, cells = cells.len(), "read column");
        Ok(cells)
    }
}
