// src/config.rs

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use url::Url;

use crate::sheets::{SessionOptions, DEFAULT_API_BASE, FIRST_DATA_ROW};

/// Command-line flags. Each one can also come from the environment, and any
/// unset value falls back to the YAML file given with `--config`, then to the
/// built-in defaults.
#[derive(Debug, Default, Parser)]
#[command(
    name = "sheetreader",
    version,
    about = "List the worksheets of a Google Sheet and print one column of values"
)]
pub struct Cli {
    /// Spreadsheet URL, e.g. https://docs.google.com/spreadsheets/d/<key>/edit
    #[arg(env = "SHEETREADER_SPREADSHEET_URL")]
    pub spreadsheet_url: Option<String>,

    /// YAML file with any of the settings below
    #[arg(short, long, env = "SHEETREADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Service-account key file
    #[arg(long, env = "SHEETREADER_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Worksheet title (exact, case-sensitive)
    #[arg(short, long, env = "SHEETREADER_WORKSHEET")]
    pub worksheet: Option<String>,

    /// Column to read, 1-based (A = 1)
    #[arg(long, env = "SHEETREADER_COLUMN")]
    pub column: Option<u32>,

    /// First row to read; row 1 is usually a header
    #[arg(long, env = "SHEETREADER_FIRST_ROW")]
    pub first_row: Option<u32>,

    /// Last row to read, inclusive
    #[arg(long, env = "SHEETREADER_MAX_ROW")]
    pub max_row: Option<u32>,

    /// Label printed above the values
    #[arg(long, env = "SHEETREADER_HEADING")]
    pub heading: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SHEETREADER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, hide = true, env = "SHEETREADER_API_BASE_URL")]
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    pub credential_path: PathBuf,
    pub spreadsheet_url: String,
    pub worksheet_title: String,
    pub column_index: u32,
    pub first_row: u32,
    pub max_row: u32,
    pub heading: String,
    pub timeout_secs: u64,
    pub api_base_url: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            credential_path: PathBuf::from("assets/credentials.json"),
            spreadsheet_url: String::new(),
            worksheet_title: "Lists".to_owned(),
            column_index: 1,
            first_row: FIRST_DATA_ROW,
            max_row: 1000,
            heading: "Subcontractor Names".to_owned(),
            timeout_secs: 30,
            api_base_url: DEFAULT_API_BASE.to_owned(),
        }
    }
}

impl ReaderConfig {
    /// Defaults, then the YAML file (if any), then flags/env.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        cfg.apply(cli);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(v) = &cli.spreadsheet_url {
            self.spreadsheet_url = v.clone();
        }
        if let Some(v) = &cli.credentials {
            self.credential_path = v.clone();
        }
        if let Some(v) = &cli.worksheet {
            self.worksheet_title = v.clone();
        }
        if let Some(v) = cli.column {
            self.column_index = v;
        }
        if let Some(v) = cli.first_row {
            self.first_row = v;
        }
        if let Some(v) = cli.max_row {
            self.max_row = v;
        }
        if let Some(v) = &cli.heading {
            self.heading = v.clone();
        }
        if let Some(v) = cli.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = &cli.api_base_url {
            self.api_base_url = v.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_url.trim().is_empty() {
            bail!("a spreadsheet URL is required (argument or SHEETREADER_SPREADSHEET_URL)");
        }
        ensure!(
            !self.worksheet_title.is_empty(),
            "worksheet title must not be empty"
        );
        ensure!(self.column_index >= 1, "column index is 1-based");
        ensure!(self.first_row >= 1, "first row is 1-based");
        ensure!(
            self.max_row >= self.first_row,
            "max row {} is before first row {}",
            self.max_row,
            self.first_row
        );
        ensure!(self.timeout_secs > 0, "timeout must be at least one second");
        self.api_base()?;
        Ok(())
    }

    pub fn api_base(&self) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid API base URL {:?}", self.api_base_url))
    }

    pub fn session_options(&self) -> Result<SessionOptions> {
        Ok(SessionOptions {
            api_base: self.api_base()?,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}
