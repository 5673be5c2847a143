use crate::error::{RecError, Result};
use crate::models::Dataset;

pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(RecError::EmptyDataset);
    }
    Ok(())
}

/// Rejects the empty selection up front; any other name is decided by lookup.
pub fn validate_restaurant_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RecError::UnknownRestaurant(String::new()));
    }
    Ok(())
}
