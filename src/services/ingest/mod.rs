//! Parses uploaded restaurant tables into a [`Dataset`].

use crate::error::Result;
use crate::models::{CellValue, Dataset};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Markers read as missing values, in addition to blank cells.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn coerce_cell(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }

    // plain decimals only; "inf" stays text
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
    }

    CellValue::Text(trimmed.to_string())
}

/// Reads CSV with a header row. Ragged rows are padded with missing values.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut dataset = Dataset::new(headers.iter());

    for record in reader.records() {
        let record = record?;
        dataset.push_row(record.iter().map(coerce_cell).collect())?;
    }

    info!(
        "Parsed dataset with {} rows and {} columns",
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

pub fn read_csv_str(text: &str) -> Result<Dataset> {
    read_csv(text.as_bytes())
}

pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecError;

    #[test]
    fn test_coerce_cell() {
        assert_eq!(coerce_cell("  "), CellValue::Null);
        assert_eq!(coerce_cell("42"), CellValue::Integer(42));
        assert_eq!(coerce_cell("4.1"), CellValue::Float(4.1));
        assert_eq!(coerce_cell("TRUE"), CellValue::Bool(true));
        assert_eq!(coerce_cell("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(coerce_cell(" Cafe "), CellValue::Text("Cafe".to_string()));
    }

    #[test]
    fn test_missing_markers_are_null() {
        for marker in ["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>", "#N/A", " NA "] {
            assert_eq!(coerce_cell(marker), CellValue::Null, "{marker:?}");
        }
        // matching is exact
        assert_eq!(coerce_cell("Na"), CellValue::Text("Na".to_string()));
        assert_eq!(coerce_cell("NAAN"), CellValue::Text("NAAN".to_string()));
    }

    #[test]
    fn test_missing_markers_drop_out_of_names() {
        let dataset = read_csv_str("name,cuisines\nA,Thai\nNA,Thai\nnull,Cafe\nB,NA\n").unwrap();
        assert_eq!(dataset.distinct_names("name").unwrap(), vec!["A", "B"]);
        assert_eq!(dataset.cell(3, "cuisines"), Some(&CellValue::Null));
    }

    #[test]
    fn test_headers_are_not_trimmed() {
        let dataset = read_csv_str(" name,cuisines \nA,Thai\n").unwrap();
        assert_eq!(dataset.columns(), &[" name", "cuisines "]);
        assert!(!dataset.has_column("name"));
    }

    #[test]
    fn test_read_csv() {
        let dataset = read_csv_str(
            "name,cuisines,location,rest_type\n\
             Jalsa,\"North Indian, Chinese\",Banashankari,Casual Dining\n\
             Spice Elephant,,Banashankari\n",
        )
        .unwrap();

        assert_eq!(dataset.columns(), &["name", "cuisines", "location", "rest_type"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.cell(0, "cuisines"),
            Some(&CellValue::Text("North Indian, Chinese".to_string()))
        );
        assert_eq!(dataset.cell(1, "cuisines"), Some(&CellValue::Null));
        assert_eq!(dataset.cell(1, "rest_type"), Some(&CellValue::Null));
    }

    #[test]
    fn test_read_csv_duplicate_headers() {
        let dataset = read_csv_str("name,name\nA,B\n").unwrap();
        assert_eq!(dataset.columns(), &["name", "name.1"]);
    }

    #[test]
    fn test_read_csv_rejects_long_rows() {
        let err = read_csv_str("name\nA,B\n").unwrap_err();
        assert!(matches!(err, RecError::RowTooLong { .. }));
    }
}
