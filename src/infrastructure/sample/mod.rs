// ============================================================
// SAMPLE LOADING
// ============================================================
// Turn an uploaded sample file into column samples

mod csv_reader;
mod xlsx_reader;

pub use csv_reader::{detect_delimiter, CsvSampleReader};
pub use xlsx_reader::read_workbook;

use std::path::Path;

use crate::domain::column::SampleTable;
use crate::domain::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Xlsx,
    Delimited,
}

impl SampleFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" => Ok(SampleFormat::Xlsx),
            "csv" | "txt" | "tsv" => Ok(SampleFormat::Delimited),
            other => Err(AppError::ValidationError(format!(
                "Unsupported sample file type '{}' ({})",
                other, file_name
            ))),
        }
    }
}

/// Parse an uploaded sample; `delimiter` only applies to delimited text
pub fn load_sample_bytes(
    file_name: &str,
    bytes: Vec<u8>,
    delimiter: Option<u8>,
) -> Result<SampleTable> {
    match SampleFormat::from_file_name(file_name)? {
        SampleFormat::Xlsx => read_workbook(bytes),
        SampleFormat::Delimited => {
            let mut reader = CsvSampleReader::new();
            if let Some(delimiter) = delimiter {
                reader = reader.with_delimiter(delimiter);
            }
            reader.read_bytes(&bytes)
        }
    }
}

pub fn load_sample(path: &Path, delimiter: Option<u8>) -> Result<SampleTable> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::IoError(format!("Failed to read sample {}: {}", path.display(), e))
    })?;
    let file_name = path.to_string_lossy();
    load_sample_bytes(&file_name, bytes, delimiter)
}

/// Single-byte delimiter from the request's delimiter code; `\t` and `tab` mean tab
pub fn parse_delimiter(code: &str) -> Option<u8> {
    match code {
        "" => None,
        "\\t" | "tab" | "\t" => Some(b'\t'),
        other if other.len() == 1 => other.bytes().next(),
        _ => None,
    }
}
