// src/sheets/api.rs

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// The two read calls the accessor needs from the Sheets service.
///
/// Implementations report 401 as `Authentication` and 403/404 as
/// `SpreadsheetNotFound` (with the spreadsheet id in `url`).
pub trait SheetsApi {
    /// Spreadsheet title and per-worksheet properties, in native order.
    fn spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata>;

    /// Values of an A1 range, column-major.
    fn column_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: u32,
    /// Absent for object sheets (charts).
    #[serde(default)]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Trailing empty cells are omitted by the service; an all-empty range
    /// has no `values` at all.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// The first column of a column-major range as display strings.
    pub fn first_column(&self) -> Vec<String> {
        self.values
            .first()
            .map(|col| col.iter().map(cell_to_string).collect())
            .unwrap_or_default()
    }
}

fn cell_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        other => other.to_string(),
    }
}

/// Google's JSON error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
