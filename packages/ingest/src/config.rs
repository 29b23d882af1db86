//! Configuration constants, sanitizers and validation functions.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{IngestError, Result};

/// Maximum accepted input file size in bytes (10 MiB).
///
/// Uploads are rejected before any decoding so an oversized file never
/// reaches the scanner.
pub const MAX_INPUT_SIZE: u64 = 10 * 1024 * 1024;

/// Number of leading rows scanned for a serial-number header marker.
pub const HEADER_MARKER_SCAN_ROWS: usize = 20;

/// Number of leading rows scanned for the first non-empty row fallback.
pub const HEADER_FALLBACK_SCAN_ROWS: usize = 10;

/// Excel's hard limit on sheet name length.
pub const SHEET_NAME_MAX_CHARS: usize = 31;

/// Characters Excel refuses inside sheet names.
const ILLEGAL_SHEET_NAME_CHARS: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];

/// Period label pattern: YYYY-MM.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PERIOD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid regex"));

/// Validate a period label (YYYY-MM).
///
/// # Examples
/// ```
/// use sectorsplit_ingest::config::validate_period_label;
///
/// assert!(validate_period_label("2026-07").is_ok());
/// assert!(validate_period_label("July 2026").is_err());
/// ```
pub fn validate_period_label(label: &str) -> Result<()> {
    if PERIOD_PATTERN.is_match(label) {
        Ok(())
    } else {
        Err(IngestError::InvalidPeriodLabel(label.to_string()))
    }
}

/// The current year-month, used when no period label is given.
#[must_use]
pub fn default_period_label() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

/// Sanitize a unit name for use as an Excel sheet name.
///
/// Replaces characters Excel rejects with underscores and truncates to
/// 31 characters on a character boundary.
pub fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .take(SHEET_NAME_MAX_CHARS)
        .map(|c| {
            if ILLEGAL_SHEET_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Sanitize a name for use as a file stem.
///
/// Anything outside `[A-Za-z0-9_-]` becomes an underscore, matching how
/// download names were historically cleaned.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
