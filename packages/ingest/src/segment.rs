//! Unit segmenter: partition data rows into per-unit record groups.
//!
//! Data rows below the header are consumed one at a time by a two-state
//! machine (`Idle` / `InUnit`). A non-empty unit-name cell either opens
//! (or re-opens) a group, or — when it echoes the header or names an
//! aggregate like "TOTAL" — resets the machine so the stray rows that
//! follow are not attributed to the previous unit.

use std::collections::HashMap;

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::normalize::{contains_unit_type_token, loose_unit_key, strict};
use crate::scan::HeaderDetection;
use crate::sheet::{CellValue, RawSheet};

/// Labels that mark a summary row rather than a real unit.
const AGGREGATE_TOKENS: [&str; 19] = [
    "total",
    "totals",
    "sum",
    "summary",
    "sector",
    "district",
    "region",
    "grand total",
    "subtotal",
    "overall",
    "all schools",
    "all",
    "sector total",
    "district total",
    "region total",
    "province",
    "provincial",
    "national",
    "country",
];

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_RANGE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[-–]\s*\d+$").expect("valid regex"));

/// One unit's record group: its display name, every row attributed to
/// it (source column layout, name row included), and the order in which
/// it was first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecordGroup {
    /// Unit name as it first appeared in the sheet.
    pub unit_name: String,

    /// Data rows in source layout, in sheet order.
    pub rows: Vec<Vec<CellValue>>,

    /// Discovery sequence number (0-based).
    pub first_seen_order: usize,
}

impl UnitRecordGroup {
    /// Loose comparison key for this group's name.
    #[must_use]
    pub fn key(&self) -> String {
        loose_unit_key(&self.unit_name)
    }
}

/// Segmentation state: either between units or collecting rows for one.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentState {
    Idle,
    InUnit(String),
}

/// How a row's unit-name cell was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowKind {
    /// Empty unit-name cell: continuation of the current unit, if any.
    Continuation,
    /// The cell repeats a header cell.
    HeaderEcho,
    /// The cell names a total/summary, not a unit.
    Aggregate,
    /// A genuine unit name.
    UnitName(String),
}

/// Partition the rows below the header into ordered per-unit groups.
///
/// Deterministic: identical input yields identical groups in identical
/// order. A unit name reappearing later in the sheet merges its rows
/// into the group created at first sight.
#[must_use]
pub fn segment_units(
    sheet: &RawSheet,
    detection: &HeaderDetection,
    unit_column: usize,
) -> Vec<UnitRecordGroup> {
    let header_keys: Vec<String> = detection
        .cells
        .iter()
        .map(|c| strict(c))
        .filter(|c| !c.is_empty())
        .collect();

    let mut groups: Vec<UnitRecordGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut state = SegmentState::Idle;

    for row_index in (detection.row_index + 1)..sheet.row_count() {
        let row = &sheet.rows[row_index];
        let candidate = sheet.cell(row_index, unit_column).to_display();
        let candidate = candidate.trim();

        match classify_row(candidate, &header_keys) {
            RowKind::Continuation => match &state {
                SegmentState::InUnit(key) => {
                    if let Some(&i) = index_by_key.get(key) {
                        groups[i].rows.push(row.clone());
                    }
                }
                SegmentState::Idle => {
                    trace!(row_index, "no current unit, row discarded");
                }
            },
            RowKind::HeaderEcho => {
                trace!(row_index, "header repetition discarded");
                state = SegmentState::Idle;
            }
            RowKind::Aggregate => {
                trace!(row_index, candidate, "aggregate row discarded");
                state = SegmentState::Idle;
            }
            RowKind::UnitName(name) => {
                let key = loose_unit_key(&name);
                let index = match index_by_key.get(&key) {
                    Some(&i) => i,
                    None => {
                        let order = groups.len();
                        groups.push(UnitRecordGroup {
                            unit_name: name,
                            rows: Vec::new(),
                            first_seen_order: order,
                        });
                        index_by_key.insert(key.clone(), order);
                        order
                    }
                };
                groups[index].rows.push(row.clone());
                state = SegmentState::InUnit(key);
            }
        }
    }

    groups.retain(|g| !g.rows.is_empty());
    debug!(units = groups.len(), "segmentation complete");
    groups
}

/// Pure per-row classification of the unit-name cell.
fn classify_row(candidate: &str, header_keys: &[String]) -> RowKind {
    if candidate.is_empty() {
        return RowKind::Continuation;
    }

    let candidate_key = strict(candidate);
    if header_keys.iter().any(|h| h == &candidate_key) {
        return RowKind::HeaderEcho;
    }

    if is_aggregate_label(candidate) {
        return RowKind::Aggregate;
    }

    RowKind::UnitName(candidate.to_string())
}

/// Whether a non-empty unit-name cell labels a summary row.
///
/// A school-type token anywhere in the text always wins: "GS KIGALI" is
/// a school even though it is short and upper-case.
fn is_aggregate_label(raw: &str) -> bool {
    if contains_unit_type_token(raw) {
        return false;
    }

    let value = loose_unit_key(raw);
    let token_match = AGGREGATE_TOKENS.iter().any(|token| {
        let token = loose_unit_key(token);
        !token.is_empty()
            && (value == token
                || value.starts_with(&format!("{token} "))
                || value.ends_with(&format!(" {token}")))
    });
    if token_match {
        return true;
    }

    // Short shouty labels like "SECTOR" or "TOTAL 2026"
    let trimmed = raw.trim();
    if trimmed == trimmed.to_uppercase()
        && trimmed.chars().count() < 15
        && trimmed.split_whitespace().count() <= 2
    {
        return true;
    }

    // Bare numbers and numeric ranges ("12", "10 - 20")
    NUMERIC_LABEL.is_match(trimmed) || NUMERIC_RANGE_LABEL.is_match(trimmed)
}
