use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use super::{ReportRow, COLUMNS};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Longest text a spreadsheet cell accepts, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// `text` cut to [`MAX_CELL_CHARS`] characters, or `None` if it already fits.
fn truncate_cell(text: &str) -> Option<&str> {
    text.char_indices()
        .nth(MAX_CELL_CHARS)
        .map(|(byte_offset, _)| &text[..byte_offset])
}

fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    repository: &str,
) -> Result<(), XlsxError> {
    let text = match truncate_cell(text) {
        Some(cut) => {
            tracing::warn!(
                "Truncated {} cell of {} to {} characters",
                COLUMNS[col as usize],
                repository,
                MAX_CELL_CHARS
            );
            cut
        }
        None => text,
    };
    sheet.write_string(row, col, text)?;
    Ok(())
}

/// `alerts_report_<suffix>_<YYYYMMDD_HHMMSS>.xlsx`
pub fn report_filename(suffix: &str, at: DateTime<Local>) -> String {
    let suffix: String = suffix
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("alerts_report_{}_{}.xlsx", suffix, at.format("%Y%m%d_%H%M%S"))
}

/// Save `rows` as a single-sheet workbook in `dir` and return its path.
///
/// The header row is always written, so an empty run still produces a file.
pub fn write_report(
    rows: &[ReportRow],
    dir: &Path,
    suffix: &str,
    at: DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(report_filename(suffix, at));
    let mut workbook = Workbook::new();

    {
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, title) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            let repo = row.repository.as_str();
            write_text(sheet, r, 0, &row.repository, repo)?;
            write_text(sheet, r, 1, &row.alert_type, repo)?;
            sheet.write_number(r, 2, row.alert_number as f64)?;
            write_text(sheet, r, 3, &row.description, repo)?;
            write_text(sheet, r, 4, &row.severity, repo)?;
            if let Some(package) = &row.package_name {
                write_text(sheet, r, 5, package, repo)?;
            }
            if let Some(range) = &row.vulnerable_version_range {
                write_text(sheet, r, 6, range, repo)?;
            }
            if let Some(patched) = &row.patched_version {
                write_text(sheet, r, 7, patched, repo)?;
            }
            write_text(sheet, r, 8, &row.state, repo)?;
            write_text(sheet, r, 9, &row.created_at, repo)?;
            write_text(sheet, r, 10, &row.updated_at, repo)?;
            write_text(sheet, r, 11, &row.url, repo)?;
        }

        sheet.autofit();
    }

    workbook.save(&path)?;
    Ok(path)
}
