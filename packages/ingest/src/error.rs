//! Error types for the ingestion pipeline.
//!
//! One `IngestError` enum for library consumers; every validation failure
//! carries enough context to be shown to the person who uploaded the file.

use thiserror::Error;

/// Main error type for the ingestion library.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Uploaded file exceeds the input size cap.
    #[error("Input file is too large ({size} bytes). Maximum allowed size is {limit} bytes")]
    OversizedInput { size: u64, limit: u64 },

    /// The workbook has no usable sheet or the first sheet is empty.
    #[error("The workbook contains no rows to process")]
    EmptyWorkbook,

    /// No header cell could be resolved as the unit name column.
    #[error(
        "Could not find the school name column{}. Found columns: {}. \
         Column matching ignores spacing and case",
        .expected.as_ref().map(|e| format!(" \"{e}\"")).unwrap_or_default(),
        format_candidates(.candidates)
    )]
    UnitColumnNotFound {
        expected: Option<String>,
        candidates: Vec<String>,
    },

    /// Discovered unit names that have no registry counterpart.
    #[error(
        "The following schools in the file are not in the selected school list: {}. \
         Add them to the list or pick a different list",
        .names.join(", ")
    )]
    UnknownUnits { names: Vec<String> },

    /// No registry unit matched any discovered group.
    #[error(
        "No matching schools found. Make sure school names in the file match \
         the names in the school list (case-insensitive)"
    )]
    NoUnitsMatched,

    /// Row selection index out of range (manual assembly).
    #[error("Selected row index {index} is out of range (only {len} rows available)")]
    InvalidSelection { index: usize, len: usize },

    /// Invalid period label format.
    #[error("Invalid period label: '{0}'. Expected YYYY-MM (e.g., 2026-07)")]
    InvalidPeriodLabel(String),

    /// Failed to decode the uploaded workbook.
    #[error("Error reading Excel file: {0}")]
    SheetRead(#[from] calamine::XlsxError),

    /// Failed to render an output workbook.
    #[error("Error writing Excel file: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error (registry, signers or schema file).
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Render header candidates for the unit-column error, marking empty cells.
fn format_candidates(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| {
            if c.trim().is_empty() {
                "(empty)".to_string()
            } else {
                format!("\"{c}\"")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
