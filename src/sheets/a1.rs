// src/sheets/a1.rs
//
// A1 notation and spreadsheet URL helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static PATH_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("spreadsheet key regex should parse")
});

/// Extract the spreadsheet key from a browser URL such as
/// `https://docs.google.com/spreadsheets/d/<key>/edit?usp=sharing`.
///
/// Legacy `?key=<key>` URLs are accepted too.
pub fn spreadsheet_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if let Some(caps) = PATH_KEY_RE.captures(url.path()) {
        return Some(caps[1].to_owned());
    }
    url.query_pairs()
        .find(|(k, v)| k == "key" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// 1 → `A`, 26 → `Z`, 27 → `AA`. Column 0 does not exist.
pub fn column_letters(column: u32) -> Option<String> {
    if column == 0 {
        return None;
    }
    let mut n = column;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).ok()
}

/// Sheet titles are always quoted so names with spaces or `!` survive.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// `'<title>'!<col><first>:<col><last>`
pub fn column_range(title: &str, column: u32, first_row: u32, last_row: u32) -> Option<String> {
    let col = column_letters(column)?;
    Some(format!(
        "{}!{col}{first_row}:{col}{last_row}",
        quote_sheet_title(title)
    ))
}
