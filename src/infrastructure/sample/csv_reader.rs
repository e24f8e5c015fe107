// ============================================================
// CSV SAMPLE READER
// ============================================================
// Parse delimited samples with encoding fallback and delimiter detection

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

use crate::domain::column::SampleTable;
use crate::domain::error::{AppError, Result};

/// CSV reader producing column samples; values are whitespace-trimmed
#[derive(Debug, Default)]
pub struct CsvSampleReader {
    /// Delimiter character; detected from content when `None`
    delimiter: Option<u8>,
}

impl CsvSampleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Parse raw bytes; non-UTF-8 input is decoded as Windows-1252
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<SampleTable> {
        let content = decode(bytes);
        self.read_content(&content)
    }

    pub fn read_content(&self, content: &str) -> Result<SampleTable> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(parse_row(&headers, &record));
        }

        Ok(SampleTable::from_rows(
            headers.iter().map(str::to_string).collect(),
            rows,
        ))
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => Cow::Borrowed(content),
        Err(_) => {
            let (content, _, _) = WINDOWS_1252.decode(bytes);
            content
        }
    }
}

fn parse_row(headers: &StringRecord, record: &StringRecord) -> Vec<Option<String>> {
    (0..headers.len())
        .map(|idx| {
            record
                .get(idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Detect delimiter from content (comma, semicolon, tab, pipe)
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<_> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    if sample_lines.is_empty() {
        return best_delimiter;
    }

    for &delimiter in &candidates {
        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        // Score by consistency (low standard deviation) and frequency
        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let table = CsvSampleReader::new()
            .read_content("id,name,city\n1,Alice,NYC\n2,Bob,")
            .unwrap();

        assert_eq!(table.row_count, 2);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[1].values[0].as_deref(), Some("Alice"));
        assert_eq!(table.columns[2].values[1], None);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a|b\nc|d"), b'|');
    }

    #[test]
    fn test_explicit_delimiter_wins() {
        let table = CsvSampleReader::new()
            .with_delimiter(b'|')
            .read_content("a,b|c\n1,2|3")
            .unwrap();
        assert_eq!(table.columns[0].name, "a,b");
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = b"name\ncaf\xe9\n";
        let table = CsvSampleReader::new().read_bytes(bytes).unwrap();
        assert_eq!(table.columns[0].values[0].as_deref(), Some("caf\u{e9}"));
    }

    #[test]
    fn test_header_only_sample_is_empty() {
        let table = CsvSampleReader::new().read_content("id,name\n").unwrap();
        assert!(table.is_empty());
    }
}
