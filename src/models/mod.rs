use crate::error::{RecError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single dataset cell. Missing values are decided once, at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Textual representation, `None` for missing cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Textual representation with missing cells filled by the empty string.
    pub fn to_feature_text(&self) -> String {
        self.as_text().unwrap_or_default()
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            nested => CellValue::Text(nested.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Tabular restaurant data: unique, ordered column names and rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Creates an empty dataset. Repeated header names get a `.N` suffix.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut unique = Vec::new();
        for column in columns {
            let column = column.into();
            let mut candidate = column.clone();
            while seen.contains_key(&candidate) {
                let count = seen.entry(column.clone()).or_insert(0);
                *count += 1;
                candidate = format!("{}.{}", column, count);
            }
            seen.insert(candidate.clone(), 0);
            unique.push(candidate);
        }

        Self {
            columns: unique,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset from JSON objects. Columns follow first-appearance order.
    pub fn from_records(records: Vec<serde_json::Map<String, serde_json::Value>>) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut known = HashSet::new();
        for record in &records {
            for key in record.keys() {
                if known.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }

        let mut dataset = Dataset::new(columns);
        for mut record in records {
            let cells = dataset
                .columns
                .iter()
                .map(|column| {
                    record
                        .remove(column)
                        .map(CellValue::from_json)
                        .unwrap_or(CellValue::Null)
                })
                .collect();
            dataset.push_row(cells)?;
        }

        Ok(dataset)
    }

    /// Appends a row. Short rows are padded with missing values.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) -> Result<()> {
        if cells.len() > self.columns.len() {
            return Err(RecError::RowTooLong {
                row: self.rows.len(),
                found: cells.len(),
                expected: self.columns.len(),
            });
        }
        cells.resize(self.columns.len(), CellValue::Null);
        self.rows.push(cells);
        Ok(())
    }

    pub fn with_row<I, V>(mut self, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.push_row(cells.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let col = self
            .column_index(column)
            .ok_or_else(|| RecError::UnknownColumn(column.to_string()))?;
        Ok(self.rows.iter().map(move |cells| &cells[col]))
    }

    /// Unique non-missing values of a column, in first-appearance order.
    pub fn distinct_names(&self, column: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .column_values(column)?
            .filter_map(CellValue::as_text)
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }
}

/// The four semantic roles a dataset column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Name,
    Cuisine,
    Location,
    RestType,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::Name,
        ColumnRole::Cuisine,
        ColumnRole::Location,
        ColumnRole::RestType,
    ];
}

/// Raw detection result; a role is `None` when none of its aliases matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDetection {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub rest_type: Option<String>,
}

/// Columns used for training and lookup, after fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub rest_type: String,
}

impl ColumnAssignment {
    pub fn column(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Name => &self.name,
            ColumnRole::Cuisine => &self.cuisine,
            ColumnRole::Location => &self.location,
            ColumnRole::RestType => &self.rest_type,
        }
    }

    /// Feature columns in combination order.
    pub fn feature_columns(&self) -> [&str; 3] {
        [&self.cuisine, &self.location, &self.rest_type]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub vocabulary_size: usize,
    pub fingerprint: u64,
    pub duration_ms: u64,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub restaurant: String,
    pub recommendations: Vec<RecommendationItem>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResponse {
    pub fn names(&self) -> Vec<&str> {
        self.recommendations.iter().map(|r| r.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub rank: usize,
    pub index: usize,
    pub name: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(CellValue::Null.as_text(), None);
        assert_eq!(CellValue::Null.to_feature_text(), "");
        assert_eq!(CellValue::Integer(3).to_feature_text(), "3");
        assert_eq!(CellValue::Float(4.0).to_feature_text(), "4.0");
        assert_eq!(CellValue::Float(4.5).to_feature_text(), "4.5");
        assert_eq!(CellValue::Bool(true).to_feature_text(), "True");
        assert_eq!(CellValue::from(None::<&str>), CellValue::Null);
    }

    #[test]
    fn test_duplicate_columns_are_renamed() {
        let dataset = Dataset::new(["name", "name", "city", "name"]);
        assert_eq!(dataset.columns(), &["name", "name.1", "city", "name.2"]);
    }

    #[test]
    fn test_push_row_pads_and_rejects() {
        let mut dataset = Dataset::new(["name", "city"]);
        dataset.push_row(vec!["A".into()]).unwrap();
        assert_eq!(dataset.cell(0, "city"), Some(&CellValue::Null));

        let err = dataset
            .push_row(vec!["A".into(), "X".into(), "extra".into()])
            .unwrap_err();
        assert!(matches!(err, RecError::RowTooLong { row: 1, found: 3, expected: 2 }));
    }

    #[test]
    fn test_from_records() {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(
            r#"[{"name": "A", "rating": 4}, {"name": "B", "city": "X"}, {"name": null}]"#,
        )
        .unwrap();
        let dataset = Dataset::from_records(records).unwrap();
        assert_eq!(dataset.columns(), &["name", "rating", "city"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.cell(0, "rating"), Some(&CellValue::Integer(4)));
        assert_eq!(dataset.cell(0, "city"), Some(&CellValue::Null));
        assert_eq!(dataset.cell(2, "name"), Some(&CellValue::Null));
    }

    #[test]
    fn test_distinct_names() {
        let dataset = Dataset::new(["name"])
            .with_row([Some("B")]).unwrap()
            .with_row([None::<&str>]).unwrap()
            .with_row([Some("A")]).unwrap()
            .with_row([Some("B")]).unwrap();
        assert_eq!(dataset.distinct_names("name").unwrap(), vec!["B", "A"]);
        assert!(matches!(
            dataset.distinct_names("title"),
            Err(RecError::UnknownColumn(_))
        ));
    }
}
