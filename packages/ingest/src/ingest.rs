//! Pipeline orchestration.
//!
//! `ingest` is the whole run in one call: decode, scan, segment, match,
//! remap, assemble. It touches no filesystem; `workbook::write_outputs`
//! does the writing. `preview` and `manual_assemble` support the
//! review-then-build flow for sheets the segmenter cannot handle.

use tracing::info;

use crate::assemble::{
    assemble_document, assemble_lead_document, DocumentSigners, OutputDocument,
};
use crate::config::validate_period_label;
use crate::error::{IngestError, Result};
use crate::registry::{match_groups, resolve_unit_head, Registry, SignerDirectory};
use crate::scan::{detect_header, resolve_unit_column};
use crate::schema::{ColumnMapping, TargetSchema};
use crate::segment::segment_units;
use crate::sheet::{CellValue, RawSheet};

/// One unit's assembled output plus the name the output file takes.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutput {
    /// Canonical unit name from the registry.
    pub unit_name: String,

    pub document: OutputDocument,
}

/// The complete result of one ingestion run, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Validated period label (YYYY-MM); names the run directory.
    pub period_label: String,

    /// The combined workbook's leading sheet.
    pub lead: OutputDocument,

    /// Per-unit documents in registry order.
    pub units: Vec<UnitOutput>,
}

/// Scanner output for the manual review flow.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPreview {
    /// Zero-based index of the detected header row.
    pub header_row_index: usize,

    /// Header cells as displayed.
    pub headers: Vec<String>,

    /// Index of the resolved unit-name column.
    pub unit_column: usize,

    /// All rows below the header, in source layout.
    pub rows: Vec<Vec<CellValue>>,

    /// Default selection: indices into `rows` of every non-empty row.
    pub selected: Vec<usize>,
}

/// Run the full pipeline on an uploaded workbook.
///
/// Every validation failure aborts the whole run; there are no partial
/// outcomes. The returned documents are in final order: lead sheet
/// first, then one document per matched unit in registry order.
pub fn ingest(
    sheet_bytes: &[u8],
    schema: &TargetSchema,
    registry: &Registry,
    signers: &SignerDirectory,
    period_label: &str,
) -> Result<IngestOutcome> {
    validate_period_label(period_label)?;

    let sheet = RawSheet::from_xlsx_bytes(sheet_bytes)?;
    let detection = detect_header(&sheet)?;
    let unit_column = resolve_unit_column(&detection, Some(&schema.unit_column))?;

    let groups = segment_units(&sheet, &detection, unit_column);
    let matched = match_groups(groups, &registry.canonical_units())?;

    let mapping = ColumnMapping::build(&detection.cells, &schema.columns);
    let sector_signers = DocumentSigners {
        inspector: signers.inspector.clone(),
        secretary: signers.secretary.clone(),
        unit_head: None,
    };

    let lead_rows: Vec<Vec<CellValue>> =
        sheet.rows[detection.row_index + 1..].to_vec();
    let lead = assemble_lead_document(schema, lead_rows, &sector_signers);

    let mut units = Vec::with_capacity(matched.len());
    for pair in matched {
        let projected = pair
            .group
            .rows
            .iter()
            .map(|row| mapping.project(row))
            .collect();
        let unit_signers = DocumentSigners {
            inspector: signers.inspector.clone(),
            secretary: signers.secretary.clone(),
            unit_head: resolve_unit_head(&pair.unit, signers),
        };
        let document = assemble_document(&pair.unit.name, schema, projected, &unit_signers);
        units.push(UnitOutput {
            unit_name: pair.unit.name,
            document,
        });
    }

    info!(
        units = units.len(),
        period = period_label,
        "ingestion complete"
    );

    Ok(IngestOutcome {
        period_label: period_label.to_string(),
        lead,
        units,
    })
}

/// Scan an uploaded workbook without segmenting or matching it.
///
/// Used when the caller wants to pick rows by hand; every non-empty
/// data row is pre-selected.
pub fn preview(sheet_bytes: &[u8], schema: &TargetSchema) -> Result<SheetPreview> {
    let sheet = RawSheet::from_xlsx_bytes(sheet_bytes)?;
    let detection = detect_header(&sheet)?;
    let unit_column = resolve_unit_column(&detection, Some(&schema.unit_column))?;

    let rows: Vec<Vec<CellValue>> = sheet.rows[detection.row_index + 1..].to_vec();
    let selected = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(CellValue::is_empty))
        .map(|(index, _)| index)
        .collect();

    Ok(SheetPreview {
        header_row_index: detection.row_index,
        headers: detection.cells,
        unit_column,
        rows,
        selected,
    })
}

/// Assemble one document from hand-picked rows.
///
/// The unit head is looked up in the signer directory by `title`; the
/// registry plays no part here. Selection indices must be in range.
pub fn manual_assemble(
    schema: &TargetSchema,
    source_headers: &[String],
    rows: &[Vec<CellValue>],
    selected: &[usize],
    signers: &SignerDirectory,
    title: &str,
) -> Result<OutputDocument> {
    if let Some(&index) = selected.iter().find(|&&index| index >= rows.len()) {
        return Err(IngestError::InvalidSelection {
            index,
            len: rows.len(),
        });
    }

    let mapping = ColumnMapping::build(source_headers, &schema.columns);
    let projected = selected
        .iter()
        .map(|&index| mapping.project(&rows[index]))
        .collect();

    let document_signers = DocumentSigners {
        inspector: signers.inspector.clone(),
        secretary: signers.secretary.clone(),
        unit_head: signers.active_head_for(title),
    };

    Ok(assemble_document(title, schema, projected, &document_signers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SignatureSections;
    use pretty_assertions::assert_eq;

    fn schema() -> TargetSchema {
        TargetSchema {
            name: "Monthly".to_string(),
            columns: vec![
                "S/N".to_string(),
                "School Name".to_string(),
                "Enrolled".to_string(),
            ],
            unit_column: "School Name".to_string(),
            signatures: SignatureSections::default(),
        }
    }

    fn text_rows(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
            .collect()
    }

    #[test]
    fn test_manual_assemble_projects_selected_rows() {
        let headers = vec![
            "S/N".to_string(),
            "SchoolName".to_string(),
            "Enrolled".to_string(),
        ];
        let rows = text_rows(&[
            &["1", "GS Kigali", "120"],
            &["", "", ""],
            &["2", "GS Kigali", "80"],
        ]);

        let document = manual_assemble(
            &schema(),
            &headers,
            &rows,
            &[0, 2],
            &SignerDirectory::default(),
            "GS Kigali",
        )
        .unwrap();

        assert_eq!(document.rows.len(), 2);
        assert_eq!(
            document.rows[0][1],
            CellValue::Text("GS Kigali".to_string())
        );
        assert_eq!(document.rows[1][2], CellValue::Text("80".to_string()));
        assert!(document.trailer.is_empty());
    }

    #[test]
    fn test_manual_assemble_rejects_out_of_range_selection() {
        let err = manual_assemble(
            &schema(),
            &[],
            &[],
            &[3],
            &SignerDirectory::default(),
            "GS Kigali",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidSelection { index: 3, len: 0 }
        ));
    }

    #[test]
    fn test_ingest_rejects_bad_period_before_decoding() {
        let err = ingest(
            &[],
            &schema(),
            &Registry::default(),
            &SignerDirectory::default(),
            "July 2026",
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::InvalidPeriodLabel(_)));
    }
}
