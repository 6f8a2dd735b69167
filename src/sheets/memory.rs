// src/sheets/memory.rs
//
// In-process stand-in for the Sheets service, used by the unit tests.

use serde_json::Value;
use std::{
    cell::Cell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use super::api::{
    GridProperties, SheetEntry, SheetProperties, SheetsApi, SpreadsheetMetadata,
    SpreadsheetProperties, ValueRange,
};
use crate::error::{Result, SheetError};

#[derive(Debug, Clone)]
pub struct MemorySheet {
    pub title: String,
    pub rows: u32,
    pub cols: u32,
    /// False for sheets with no cell grid, such as chart sheets.
    pub has_grid: bool,
    /// (row, col), both 1-based.
    pub cells: BTreeMap<(u32, u32), String>,
}

impl MemorySheet {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            rows: 1000,
            cols: 26,
            has_grid: true,
            cells: BTreeMap::new(),
        }
    }

    pub fn with_grid(mut self, rows: u32, cols: u32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn without_grid(mut self) -> Self {
        self.has_grid = false;
        self
    }

    /// Fill `col` from row 1 downwards.
    pub fn with_column(mut self, col: u32, values: &[&str]) -> Self {
        for (i, v) in values.iter().enumerate() {
            self.cells.insert((i as u32 + 1, col), (*v).to_owned());
        }
        self
    }

    pub fn with_cell(mut self, row: u32, col: u32, value: &str) -> Self {
        self.cells.insert((row, col), value.to_owned());
        self
    }
}

#[derive(Debug, Default)]
pub struct MemorySheets {
    books: HashMap<String, (String, Vec<MemorySheet>)>,
    calls: Rc<Cell<usize>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spreadsheet(mut self, id: &str, title: &str, sheets: Vec<MemorySheet>) -> Self {
        self.books.insert(id.to_owned(), (title.to_owned(), sheets));
        self
    }

    /// Shared counter of remote calls served.
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }

    fn book(&self, id: &str) -> Result<&(String, Vec<MemorySheet>)> {
        self.calls.set(self.calls.get() + 1);
        self.books
            .get(id)
            .ok_or_else(|| SheetError::SpreadsheetNotFound {
                url: id.to_owned(),
                reason: "NOT_FOUND: Requested entity was not found.".into(),
            })
    }
}

impl SheetsApi for MemorySheets {
    fn spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        let (title, sheets) = self.book(spreadsheet_id)?;
        Ok(SpreadsheetMetadata {
            spreadsheet_id: spreadsheet_id.to_owned(),
            properties: SpreadsheetProperties {
                title: title.clone(),
            },
            sheets: sheets
                .iter()
                .enumerate()
                .map(|(i, s)| SheetEntry {
                    properties: SheetProperties {
                        sheet_id: i as i64 * 100,
                        title: s.title.clone(),
                        index: i as u32,
                        grid_properties: s.has_grid.then(|| GridProperties {
                            row_count: s.rows,
                            column_count: s.cols,
                        }),
                    },
                })
                .collect(),
        })
    }

    fn column_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let (_, sheets) = self.book(spreadsheet_id)?;
        let (title, col, first, last) = parse_column_range(range)
            .ok_or_else(|| SheetError::unclassified(format!("Unable to parse range: {range}")))?;
        let sheet = sheets
            .iter()
            .find(|s| s.title == title)
            .ok_or_else(|| SheetError::unclassified(format!("Unable to parse range: {range}")))?;
        if !sheet.has_grid {
            return Err(SheetError::unclassified(format!(
                "Range ({range}) is not supported on a sheet without a grid"
            )));
        }
        if col > sheet.cols || last > sheet.rows {
            return Err(SheetError::unclassified(format!(
                "Range ({range}) exceeds grid limits"
            )));
        }

        let mut column: Vec<Value> = (first..=last)
            .map(|row| {
                Value::String(sheet.cells.get(&(row, col)).cloned().unwrap_or_default())
            })
            .collect();
        while matches!(column.last(), Some(Value::String(s)) if s.is_empty()) {
            column.pop();
        }

        Ok(ValueRange {
            range: range.to_owned(),
            major_dimension: Some("COLUMNS".into()),
            values: if column.is_empty() {
                Vec::new()
            } else {
                vec![column]
            },
        })
    }
}

/// Parses the single-column ranges built by `a1::column_range`.
fn parse_column_range(range: &str) -> Option<(String, u32, u32, u32)> {
    let (quoted, cells) = range.rsplit_once('!')?;
    let title = quoted
        .strip_prefix('\'')?
        .strip_suffix('\'')?
        .replace("''", "'");
    let (start, end) = cells.split_once(':')?;
    let (c1, r1) = split_cell(start)?;
    let (c2, r2) = split_cell(end)?;
    if c1 != c2 {
        return None;
    }
    Some((title, c1, r1, r2))
}

fn split_cell(cell: &str) -> Option<(u32, u32)> {
    let digits_at = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(digits_at);
    if letters.is_empty() {
        return None;
    }
    let col = letters.bytes().try_fold(0u32, |acc, b| {
        b.is_ascii_uppercase()
            .then(|| acc * 26 + u32::from(b - b'A' + 1))
    })?;
    Some((col, digits.parse().ok()?))
}
