//! Read-only accessor for Google Sheets: authenticate with a service-account
//! key, open a spreadsheet by URL, list its worksheets and read one column.

pub mod auth;
pub mod config;
pub mod error;
pub mod reader;
pub mod sheets;

pub use config::{Cli, ReaderConfig};
pub use error::{ErrorKind, Result, SheetError};
pub use reader::{Report, SheetReader};
pub use sheets::{Cell, Session, Spreadsheet, Worksheet};
