//! Raw sheet model and xlsx decoding.
//!
//! A [`RawSheet`] is the immutable input to the pipeline: an ordered
//! sequence of rows of [`CellValue`]s in the uploaded file's own layout.
//! Only the first worksheet of the uploaded workbook is read.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use crate::config::MAX_INPUT_SIZE;
use crate::error::{IngestError, Result};

/// A single cell value: text, number, or empty.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Whether this cell carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Render the cell the way a user would read it.
    ///
    /// Whole numbers print without a trailing `.0` so "42" round-trips.
    #[must_use]
    pub fn to_display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// The uploaded sheet as an ordered grid of cells.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// Build a sheet directly from rows (used by tests and manual flows).
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Decode the first worksheet of an xlsx file held in memory.
    ///
    /// Rejects oversized input before any decoding. Leading empty rows
    /// and columns are padded back in so row/column indices match what
    /// the uploader sees in Excel.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() as u64 > MAX_INPUT_SIZE {
            return Err(IngestError::OversizedInput {
                size: bytes.len() as u64,
                limit: MAX_INPUT_SIZE,
            });
        }

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::EmptyWorkbook)??;

        let (start_row, start_col) = match range.start() {
            Some(start) => start,
            None => return Err(IngestError::EmptyWorkbook),
        };

        let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(range.height() + start_row as usize);
        for _ in 0..start_row {
            rows.push(Vec::new());
        }

        for source_row in range.rows() {
            let mut row: Vec<CellValue> =
                Vec::with_capacity(source_row.len() + start_col as usize);
            row.extend((0..start_col).map(|_| CellValue::Empty));
            row.extend(source_row.iter().map(convert_cell));
            rows.push(row);
        }

        debug!(rows = rows.len(), "decoded worksheet");

        if rows.iter().all(|r| r.iter().all(CellValue::is_empty)) {
            return Err(IngestError::EmptyWorkbook);
        }

        Ok(Self { rows })
    }

    /// Number of rows, including padded leading ones.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, col), treating out-of-range positions as empty.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    /// Whether the given row has no non-empty cell.
    #[must_use]
    pub fn is_row_empty(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_none_or(|r| r.iter().all(CellValue::is_empty))
    }
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}
