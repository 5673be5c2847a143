use crate::config::ColumnAliases;
use crate::error::{RecError, Result};
use crate::models::{ColumnAssignment, ColumnDetection};

/// Returns the first candidate present in `columns`. Matching is exact and case-sensitive.
pub fn detect_column<S: AsRef<str>>(columns: &[S], candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| columns.iter().any(|c| c.as_ref() == candidate.as_str()))
        .cloned()
}

/// Detects every role independently. Never fails; absent roles are `None`.
pub fn resolve_columns<S: AsRef<str>>(columns: &[S], aliases: &ColumnAliases) -> ColumnDetection {
    ColumnDetection {
        name: detect_column(columns, &aliases.name),
        cuisine: detect_column(columns, &aliases.cuisine),
        location: detect_column(columns, &aliases.location),
        rest_type: detect_column(columns, &aliases.rest_type),
    }
}

impl ColumnDetection {
    /// Applies the fallback policy: feature roles default to the name column,
    /// and a missing name column is a configuration error.
    pub fn assignment(&self, aliases: &ColumnAliases) -> Result<ColumnAssignment> {
        let name = self.name.clone().ok_or_else(|| RecError::MissingNameColumn {
            expected: aliases.name.clone(),
        })?;

        let or_name = |column: &Option<String>| column.clone().unwrap_or_else(|| name.clone());

        Ok(ColumnAssignment {
            cuisine: or_name(&self.cuisine),
            location: or_name(&self.location),
            rest_type: or_name(&self.rest_type),
            name,
        })
    }
}
