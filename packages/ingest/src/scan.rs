//! Structural scanner: locate the header row and the unit-name column.
//!
//! Merged sector sheets usually carry a few title rows before the real
//! header. The scanner looks for a serial-number marker ("S/N" and
//! friends) in the first rows, falls back to the first non-empty row,
//! and finally defaults to row 0.

use tracing::debug;

use crate::config::{HEADER_FALLBACK_SCAN_ROWS, HEADER_MARKER_SCAN_ROWS};
use crate::error::{IngestError, Result};
use crate::normalize::strict;
use crate::sheet::RawSheet;

/// Tokens that signal a serial-number ("index") column in a header row.
const SERIAL_MARKERS: [&str; 4] = ["s/n", "sn", "serial", "رقم"];

/// Keywords that identify a unit-name column when the schema's declared
/// column cannot be found.
const UNIT_COLUMN_KEYWORDS: [&str; 6] = [
    "school",
    "مدرسة",
    "اسم",
    "name",
    "institution",
    "établissement",
];

/// Result of header detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDetection {
    /// Zero-based index of the header row.
    pub row_index: usize,

    /// Header cells as displayed, including empties.
    pub cells: Vec<String>,
}

/// Locate the header row of a raw sheet.
pub fn detect_header(sheet: &RawSheet) -> Result<HeaderDetection> {
    if sheet.row_count() == 0 {
        return Err(IngestError::EmptyWorkbook);
    }

    let marker_limit = HEADER_MARKER_SCAN_ROWS.min(sheet.row_count());
    let row_index = (0..marker_limit)
        .find(|&i| row_has_serial_marker(sheet, i))
        .or_else(|| {
            let fallback_limit = HEADER_FALLBACK_SCAN_ROWS.min(sheet.row_count());
            (0..fallback_limit).find(|&i| !sheet.is_row_empty(i))
        })
        .unwrap_or(0);

    let cells: Vec<String> = sheet.rows[row_index]
        .iter()
        .map(super::sheet::CellValue::to_display)
        .collect();

    debug!(row_index, "detected header row");

    Ok(HeaderDetection { row_index, cells })
}

/// Resolve which header cell names the unit.
///
/// Tries the schema's declared column name first (strict equality, then
/// substring containment either direction), then falls back to a fixed
/// keyword set. Fails listing every header candidate considered.
pub fn resolve_unit_column(
    detection: &HeaderDetection,
    expected_column: Option<&str>,
) -> Result<usize> {
    let expected = expected_column.map(strict).filter(|e| !e.is_empty());

    if let Some(expected) = &expected {
        // Exact match, spacing and case ignored
        if let Some(index) = detection
            .cells
            .iter()
            .position(|cell| &strict(cell) == expected)
        {
            return Ok(index);
        }

        // Partial match either direction
        if let Some(index) = detection.cells.iter().position(|cell| {
            let normalized = strict(cell);
            !normalized.is_empty()
                && (normalized.contains(expected.as_str()) || expected.contains(&normalized))
        }) {
            return Ok(index);
        }
    }

    if let Some(index) = detection.cells.iter().position(|cell| {
        let normalized = strict(cell);
        UNIT_COLUMN_KEYWORDS
            .iter()
            .any(|keyword| normalized.contains(keyword))
    }) {
        return Ok(index);
    }

    Err(IngestError::UnitColumnNotFound {
        expected: expected_column.map(String::from),
        candidates: detection.cells.clone(),
    })
}

fn row_has_serial_marker(sheet: &RawSheet, row: usize) -> bool {
    let Some(cells) = sheet.rows.get(row) else {
        return false;
    };
    let joined = cells
        .iter()
        .map(|c| strict(&c.to_display()))
        .collect::<Vec<_>>()
        .join(" ");
    SERIAL_MARKERS.iter().any(|marker| joined.contains(marker))
}
