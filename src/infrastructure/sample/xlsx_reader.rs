use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xlsx};
use tracing::debug;

use crate::domain::column::SampleTable;
use crate::domain::error::{AppError, Result};

/// Read the first worksheet of an `.xlsx` workbook, every cell as text
pub fn read_workbook(bytes: Vec<u8>) -> Result<SampleTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

    let sheet_name = workbook.sheet_names().first().cloned().unwrap_or_default();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

    let table = range_to_table(&range);
    debug!(
        sheet = %sheet_name,
        columns = table.columns.len(),
        rows = table.row_count,
        "Parsed workbook sample"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> SampleTable {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect(),
        None => return SampleTable::default(),
    };

    let mut data: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    // Blank rows inside the data still count as rows
    while data
        .last()
        .is_some_and(|row| row.iter().all(Option::is_none))
    {
        data.pop();
    }

    SampleTable::from_rows(headers, data)
}

/// Cell rendered the way a string-typed spreadsheet read sees it
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) if value.is_empty() => None,
        Data::String(value) => Some(value.clone()),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Some((*value as i64).to_string())
        }
        Data::DateTime(_) => Some(
            cell.as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_renders_like_strings() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::Float(42.0)).as_deref(), Some("42"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(
            cell_text(&Data::String("abc".to_string())).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_range_to_table_uses_first_row_as_headers() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("id".to_string()));
        range.set_value((0, 1), Data::String("amount".to_string()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::Float(9.5));
        range.set_value((2, 0), Data::Float(2.0));

        let table = range_to_table(&range);
        assert_eq!(table.row_count, 2);
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[0].values[1].as_deref(), Some("2"));
        assert_eq!(table.columns[1].values[1], None);
    }

    #[test]
    fn test_blank_interior_row_is_kept() {
        use crate::application::use_cases::type_inference::infer_table;

        let mut range = Range::new((0, 0), (4, 0));
        range.set_value((0, 0), Data::String("id".to_string()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((3, 0), Data::Float(2.0));
        range.set_value((4, 0), Data::String(String::new()));

        let table = range_to_table(&range);
        assert_eq!(table.row_count, 3);
        assert_eq!(table.columns[0].values[1], None);

        let columns = infer_table(&table);
        assert!(!columns[0].primary_key);
    }

    #[test]
    fn test_invalid_workbook_is_parse_error() {
        let result = read_workbook(b"not a zip".to_vec());
        assert!(matches!(result, Err(AppError::ParseError(_))));
    }
}
