//! Workbook rendering and output writing.
//!
//! Turns assembled [`OutputDocument`]s into xlsx bytes and writes a
//! complete run to disk: one single-sheet workbook per unit plus the
//! combined multi-sheet workbook. Writes are all-or-nothing; a failure
//! removes the partially written run directory.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::{debug, warn};

use crate::assemble::OutputDocument;
use crate::config::sanitize_file_stem;
use crate::error::Result;
use crate::ingest::IngestOutcome;
use crate::sheet::CellValue;

/// Paths produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRun {
    /// The run directory, named after the period label.
    pub run_dir: PathBuf,

    /// One file per unit, in registry order.
    pub unit_files: Vec<PathBuf>,

    /// The combined multi-sheet workbook.
    pub combined_file: PathBuf,
}

/// Render one document as a single-sheet xlsx in memory.
pub fn render_unit_workbook(document: &OutputDocument) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    render_sheet(workbook.add_worksheet(), document)?;
    Ok(workbook.save_to_buffer()?)
}

/// Render the combined workbook (lead sheet first, then one sheet per
/// unit) in memory.
pub fn render_combined_workbook(outcome: &IngestOutcome) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    render_sheet(workbook.add_worksheet(), &outcome.lead)?;
    for unit in &outcome.units {
        render_sheet(workbook.add_worksheet(), &unit.document)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// Write a complete run under `out_dir`.
///
/// Creates `<out_dir>/<period>/`, writes one `<unit>.xlsx` per unit in
/// registry order and `Combined_<period>.xlsx` last. On any failure the
/// run directory is removed and the error propagated; a run either
/// exists completely or not at all.
pub fn write_outputs(outcome: &IngestOutcome, out_dir: &Path) -> Result<WrittenRun> {
    let run_dir = out_dir.join(&outcome.period_label);
    fs::create_dir_all(&run_dir)?;

    match write_run_files(outcome, &run_dir) {
        Ok(run) => Ok(run),
        Err(err) => {
            if let Err(cleanup) = fs::remove_dir_all(&run_dir) {
                warn!(?cleanup, "failed to remove partial run directory");
            }
            Err(err)
        }
    }
}

fn write_run_files(outcome: &IngestOutcome, run_dir: &Path) -> Result<WrittenRun> {
    let mut unit_files = Vec::with_capacity(outcome.units.len());
    for unit in &outcome.units {
        let path = run_dir.join(format!("{}.xlsx", sanitize_file_stem(&unit.unit_name)));
        let bytes = render_unit_workbook(&unit.document)?;
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), "wrote unit workbook");
        unit_files.push(path);
    }

    let combined_file = run_dir.join(format!("Combined_{}.xlsx", outcome.period_label));
    fs::write(&combined_file, render_combined_workbook(outcome)?)?;
    debug!(path = %combined_file.display(), "wrote combined workbook");

    Ok(WrittenRun {
        run_dir: run_dir.to_path_buf(),
        unit_files,
        combined_file,
    })
}

/// Render header, data rows and trailer onto one worksheet.
fn render_sheet(worksheet: &mut Worksheet, document: &OutputDocument) -> Result<()> {
    worksheet.set_name(&document.sheet_name)?;

    for (col, header) in document.header.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }

    let mut next_row: u32 = 1;
    for row in document.rows.iter().chain(document.trailer.iter()) {
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    worksheet.write_string(next_row, col as u16, text)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(next_row, col as u16, *number)?;
                }
            }
        }
        next_row += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(name: &str) -> OutputDocument {
        OutputDocument {
            sheet_name: name.to_string(),
            header: vec!["S/N".to_string(), "School Name".to_string()],
            rows: vec![vec![
                CellValue::Number(1.0),
                CellValue::Text("GS Kigali".to_string()),
            ]],
            trailer: vec![
                Vec::new(),
                vec![
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Text("Head Teacher".to_string()),
                    CellValue::Empty,
                    CellValue::Text("Alice Uwase".to_string()),
                ],
            ],
        }
    }

    #[test]
    fn test_render_round_trips_through_reader() {
        let bytes = render_unit_workbook(&document("GS Kigali")).unwrap();
        let sheet = crate::sheet::RawSheet::from_xlsx_bytes(&bytes).unwrap();

        assert_eq!(sheet.cell(0, 1), &CellValue::Text("School Name".to_string()));
        assert_eq!(sheet.cell(1, 0), &CellValue::Number(1.0));
        // blank trailer separator row, then the signature label row
        assert!(sheet.is_row_empty(2));
        assert_eq!(sheet.cell(3, 4), &CellValue::Text("Alice Uwase".to_string()));
    }

    #[test]
    fn test_write_outputs_all_or_nothing_on_bad_sheet() {
        use crate::ingest::{IngestOutcome, UnitOutput};

        let tmp = tempfile::tempdir().unwrap();
        let outcome = IngestOutcome {
            period_label: "2026-07".to_string(),
            lead: document("Sector Report"),
            units: vec![
                UnitOutput {
                    unit_name: "GS Kigali".to_string(),
                    document: document("GS Kigali"),
                },
                UnitOutput {
                    unit_name: "Broken".to_string(),
                    // Empty sheet names are rejected by the writer
                    document: document(""),
                },
            ],
        };

        let err = write_outputs(&outcome, tmp.path());
        assert!(err.is_err());
        assert!(
            !tmp.path().join("2026-07").exists(),
            "partial run directory must be removed"
        );
    }

    #[test]
    fn test_write_outputs_layout() {
        use crate::ingest::{IngestOutcome, UnitOutput};

        let tmp = tempfile::tempdir().unwrap();
        let outcome = IngestOutcome {
            period_label: "2026-07".to_string(),
            lead: document("Sector Report"),
            units: vec![UnitOutput {
                unit_name: "GS Kigali".to_string(),
                document: document("GS Kigali"),
            }],
        };

        let run = write_outputs(&outcome, tmp.path()).unwrap();
        assert_eq!(run.run_dir, tmp.path().join("2026-07"));
        assert_eq!(run.unit_files, vec![run.run_dir.join("GS_Kigali.xlsx")]);
        assert_eq!(
            run.combined_file,
            run.run_dir.join("Combined_2026-07.xlsx")
        );
        assert!(run.combined_file.exists());
    }
}
