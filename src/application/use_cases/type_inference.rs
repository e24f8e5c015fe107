// ============================================================
// TYPE INFERENCE
// ============================================================
// Decide a warehouse column type from sample values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use crate::domain::column::{ColumnSample, ColumnType, InferredColumn, SampleTable};

/// Date-time layouts tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%b %d, %Y"];

/// Infer a column type from present (non-absent) values.
///
/// Digit strings win over dates, so `"20200101"` is an integer.
pub fn infer_type<S: AsRef<str>>(values: &[S]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Text;
    }

    if values.iter().all(|v| is_digit_string(v.as_ref())) {
        return ColumnType::Integer;
    }

    if values.iter().all(|v| is_timestamp(v.as_ref())) {
        return ColumnType::Timestamp;
    }

    ColumnType::Text
}

/// Type, max length and key eligibility for one column.
///
/// `total_rows` counts absent cells too, so a column with any gap is never
/// a primary key.
pub fn infer_column(sample: &ColumnSample, total_rows: usize) -> InferredColumn {
    let present = sample.present_values();
    let column_type = infer_type(present.as_slice());

    let max_length = present.iter().map(|v| v.chars().count()).max();

    let distinct: HashSet<&str> = present.iter().copied().collect();
    let primary_key = !present.is_empty() && distinct.len() == total_rows;

    InferredColumn {
        name: sample.name.clone(),
        position: sample.position,
        column_type,
        max_length,
        primary_key,
    }
}

pub fn infer_table(sample: &SampleTable) -> Vec<InferredColumn> {
    sample
        .columns
        .iter()
        .map(|column| infer_column(column, sample.row_count))
        .collect()
}

fn is_digit_string(value: &str) -> bool {
    !value.is_empty() && value.chars().all(char::is_numeric)
}

fn is_timestamp(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }

    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}
