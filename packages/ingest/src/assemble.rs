//! Document assembler: turn projected rows into renderable documents.
//!
//! An [`OutputDocument`] is a complete single sheet: its Excel-safe
//! name, the target header row, the projected data rows and an optional
//! signature trailer. Assembly is pure; rendering lives in `workbook`.

use crate::config::sanitize_sheet_name;
use crate::registry::RoleHolder;
use crate::schema::{SignatureRole, SignatureSections, TargetSchema};
use crate::sheet::CellValue;

/// Name of the leading sheet in the combined workbook.
pub const LEAD_SHEET_NAME: &str = "Sector Report";

/// The dotted line a signer signs on.
const SIGNATURE_LINE: &str = "Signature: _______________";

/// One fully assembled output sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    /// Sheet name, already sanitized and truncated for Excel.
    pub sheet_name: String,

    /// Target header row, verbatim.
    pub header: Vec<String>,

    /// Data rows in target layout.
    pub rows: Vec<Vec<CellValue>>,

    /// Signature trailer rows; empty when no role signs.
    pub trailer: Vec<Vec<CellValue>>,
}

/// Resolved signers for one document.
///
/// `None` means the role has no holder and its block is omitted; the
/// lead sheet simply never carries a unit head.
#[derive(Debug, Clone, Default)]
pub struct DocumentSigners {
    pub inspector: Option<RoleHolder>,
    pub secretary: Option<RoleHolder>,
    pub unit_head: Option<RoleHolder>,
}

/// Assemble one per-unit document from already projected rows.
#[must_use]
pub fn assemble_document(
    title: &str,
    schema: &TargetSchema,
    rows: Vec<Vec<CellValue>>,
    signers: &DocumentSigners,
) -> OutputDocument {
    OutputDocument {
        sheet_name: sanitize_sheet_name(title),
        header: schema.columns.clone(),
        rows,
        trailer: signature_trailer(&schema.signatures, signers),
    }
}

/// Assemble the combined workbook's leading sheet: the whole original
/// data range under the target header, signed by the sector-wide roles
/// only.
#[must_use]
pub fn assemble_lead_document(
    schema: &TargetSchema,
    rows: Vec<Vec<CellValue>>,
    signers: &DocumentSigners,
) -> OutputDocument {
    let lead_signers = DocumentSigners {
        inspector: signers.inspector.clone(),
        secretary: signers.secretary.clone(),
        unit_head: None,
    };
    OutputDocument {
        sheet_name: LEAD_SHEET_NAME.to_string(),
        header: schema.columns.clone(),
        rows,
        trailer: signature_trailer(&schema.signatures, &lead_signers),
    }
}

/// Build the signature trailer.
///
/// Layout: one blank separator row, then for each enabled role with a
/// resolved holder a label/name row followed by a signature line, with
/// a blank row between consecutive roles. Roles without a holder are
/// omitted entirely; when nothing remains the trailer is empty.
#[must_use]
pub fn signature_trailer(
    sections: &SignatureSections,
    signers: &DocumentSigners,
) -> Vec<Vec<CellValue>> {
    let blocks: Vec<(&SignatureRole, &RoleHolder)> = [
        (&sections.inspector, signers.inspector.as_ref()),
        (&sections.secretary, signers.secretary.as_ref()),
        (&sections.unit_head, signers.unit_head.as_ref()),
    ]
    .into_iter()
    .filter(|(role, _)| role.enabled)
    .filter_map(|(role, holder)| holder.map(|h| (role, h)))
    .collect();

    if blocks.is_empty() {
        return Vec::new();
    }

    let mut trailer = vec![blank_row()];
    for (position, (role, holder)) in blocks.iter().enumerate() {
        if position > 0 {
            trailer.push(blank_row());
        }
        trailer.push(vec![
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Text(role.label.clone()),
            CellValue::Empty,
            CellValue::Text(holder.name.clone()),
        ]);
        trailer.push(vec![
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Text(SIGNATURE_LINE.to_string()),
            CellValue::Empty,
            CellValue::Empty,
        ]);
    }
    trailer
}

fn blank_row() -> Vec<CellValue> {
    Vec::new()
}
