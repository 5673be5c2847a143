use crate::error::{RecError, Result};
use crate::models::{ColumnAssignment, Dataset};

/// Builds one combined feature per row: cuisine, location and rest type joined
/// by single spaces. Missing cells contribute the empty string.
pub fn combined_features(dataset: &Dataset, assignment: &ColumnAssignment) -> Result<Vec<String>> {
    let cuisine = dataset.column_values(&assignment.cuisine)?;
    let location = dataset.column_values(&assignment.location)?;
    let rest_type = dataset.column_values(&assignment.rest_type)?;

    Ok(cuisine
        .zip(location)
        .zip(rest_type)
        .map(|((c, l), r)| {
            format!(
                "{} {} {}",
                c.to_feature_text(),
                l.to_feature_text(),
                r.to_feature_text()
            )
        })
        .collect())
}

/// Fails with `UnknownColumn` if any assigned column is missing from the dataset.
pub fn check_assignment(dataset: &Dataset, assignment: &ColumnAssignment) -> Result<()> {
    std::iter::once(assignment.name.as_str())
        .chain(assignment.feature_columns())
        .find(|column| !dataset.has_column(column))
        .map_or(Ok(()), |column| Err(RecError::UnknownColumn(column.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(name: &str, cuisine: &str, location: &str, rest_type: &str) -> ColumnAssignment {
        ColumnAssignment {
            name: name.to_string(),
            cuisine: cuisine.to_string(),
            location: location.to_string(),
            rest_type: rest_type.to_string(),
        }
    }

    #[test]
    fn test_combined_feature_order() {
        let dataset = Dataset::new(["rest_type", "name", "location", "cuisine"])
            .with_row(["cafe", "A", "X", "Italian"])
            .unwrap();
        let features =
            combined_features(&dataset, &assignment("name", "cuisine", "location", "rest_type")).unwrap();
        assert_eq!(features, vec!["Italian X cafe"]);
    }

    #[test]
    fn test_missing_values_become_empty() {
        let dataset = Dataset::new(["name", "cuisine", "location", "rest_type"])
            .with_row([Some("A"), None, Some("X"), None])
            .unwrap()
            .with_row([Some("B"), None, None, None])
            .unwrap();
        let features =
            combined_features(&dataset, &assignment("name", "cuisine", "location", "rest_type")).unwrap();
        assert_eq!(features, vec![" X ", "  "]);
    }

    #[test]
    fn test_name_fallback_repeats_name() {
        let dataset = Dataset::new(["name"]).with_row(["Dosa Hut"]).unwrap();
        let features = combined_features(&dataset, &assignment("name", "name", "name", "name")).unwrap();
        assert_eq!(features, vec!["Dosa Hut Dosa Hut Dosa Hut"]);
    }

    #[test]
    fn test_check_assignment() {
        let dataset = Dataset::new(["name", "cuisine"]);
        assert!(check_assignment(&dataset, &assignment("name", "cuisine", "name", "name")).is_ok());
        let err = check_assignment(&dataset, &assignment("name", "cuisine", "city", "name")).unwrap_err();
        assert!(matches!(err, RecError::UnknownColumn(c) if c == "city"));
    }
}
