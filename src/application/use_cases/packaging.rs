// ============================================================
// PACKAGING
// ============================================================
// Bundle generated scripts and template sheets into a download archive

use std::io::{Cursor, Write};

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::domain::config_records::{ConfigTable, SqlValue};
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::DatasetNaming;
use crate::domain::template::{GeneratedScripts, SheetKind, TemplateSheets};

/// Build the ZIP archive in memory.
///
/// The template workbook goes first when sheets are given. Empty scripts are left out.
pub fn build_archive(
    naming: &DatasetNaming,
    scripts: &GeneratedScripts,
    sheets: Option<&TemplateSheets>,
    rds_schema: &str,
) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    if let Some(sheets) = sheets {
        let workbook = template_workbook(sheets, rds_schema)?;
        write_entry(&mut zip, &naming.template_file_name(), &workbook, options)?;
    }

    for (kind, script) in scripts.iter() {
        let file_name = naming.script_file_name(kind);
        if script.is_empty() {
            warn!(file = %file_name, "Skipping empty script");
            continue;
        }
        write_entry(&mut zip, &file_name, script.as_bytes(), options)?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| AppError::IoError(format!("Failed to finish archive: {}", e)))?;
    let bytes = cursor.into_inner();

    info!(archive = %naming.archive_name(), bytes = bytes.len(), "Archive created");
    Ok(bytes)
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    contents: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options)
        .map_err(|e| AppError::IoError(format!("Failed to add {}: {}", path, e)))?;
    zip.write_all(contents)?;
    Ok(())
}

/// One worksheet per configuration sheet, in `SheetKind::ALL` order.
///
/// Sheets without rows keep their header row.
fn template_workbook(sheets: &TemplateSheets, rds_schema: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for kind in SheetKind::ALL {
        let table = sheets.config_table(kind, rds_schema);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(kind.sheet_name())
            .and_then(|worksheet| write_sheet(worksheet, &table))
            .map_err(|e| {
                AppError::IoError(format!("Failed to write sheet {}: {}", kind.sheet_name(), e))
            })?;
    }
    workbook
        .save_to_buffer()
        .map_err(|e| AppError::IoError(format!("Failed to save template workbook: {}", e)))
}

fn write_sheet(worksheet: &mut Worksheet, table: &ConfigTable) -> std::result::Result<(), XlsxError> {
    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (index, values) in table.rows.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in values.iter().enumerate() {
            match value {
                SqlValue::Null => {}
                SqlValue::Int(number) => {
                    worksheet.write_number(row, col as u16, *number as f64)?;
                }
                SqlValue::Text(text) => {
                    worksheet.write_string(row, col as u16, text)?;
                }
            }
        }
    }
    Ok(())
}
