use crate::algorithms::features::{check_assignment, combined_features};
use crate::config::Config;
use crate::error::{RecError, Result};
use crate::models::*;
use crate::services::storage::MatrixStore;
use crate::services::training::dataset_fingerprint;
use crate::utils::validation::validate_restaurant_name;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RecommendationService {
    store: Arc<dyn MatrixStore>,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn MatrixStore>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    /// Names a caller can choose from: unique, non-missing values of the name column.
    pub fn list_restaurants(&self, dataset: &Dataset, assignment: &ColumnAssignment) -> Result<Vec<String>> {
        dataset.distinct_names(&assignment.name)
    }

    /// Returns the restaurants most similar to `restaurant`, best first.
    ///
    /// The first row whose name equals `restaurant` exactly is the query row.
    /// It never appears in its own results.
    pub async fn recommend(
        &self,
        dataset: &Dataset,
        assignment: &ColumnAssignment,
        restaurant: &str,
    ) -> Result<RecommendationResponse> {
        validate_restaurant_name(restaurant)?;
        check_assignment(dataset, assignment)?;

        let model = self.store.load().await?.ok_or(RecError::NotTrained)?;

        if model.matrix.size() != dataset.len() {
            warn!(
                "Stored matrix has {} rows but dataset has {}",
                model.matrix.size(),
                dataset.len()
            );
            return Err(RecError::StaleModel {
                reason: format!(
                    "matrix covers {} rows, dataset has {}",
                    model.matrix.size(),
                    dataset.len()
                ),
            });
        }

        if self.config.recommendation.verify_dataset {
            let features = combined_features(dataset, assignment)?;
            if dataset_fingerprint(dataset, assignment, &features)? != model.fingerprint {
                warn!("Stored matrix fingerprint does not match the current dataset");
                return Err(RecError::StaleModel {
                    reason: "dataset contents changed since training".to_string(),
                });
            }
        }

        let index = dataset
            .column_values(&assignment.name)?
            .position(|cell| cell.as_text().as_deref() == Some(restaurant))
            .ok_or_else(|| RecError::UnknownRestaurant(restaurant.to_string()))?;

        let recommendations = model
            .matrix
            .nearest(index, self.config.recommendation.top_k)
            .into_iter()
            .enumerate()
            .map(|(rank, (row, score))| RecommendationItem {
                rank: rank + 1,
                index: row,
                name: dataset
                    .cell(row, &assignment.name)
                    .map(CellValue::to_feature_text)
                    .unwrap_or_default(),
                score,
            })
            .collect::<Vec<_>>();

        info!(
            "Served {} recommendations for '{}'",
            recommendations.len(),
            restaurant
        );

        Ok(RecommendationResponse {
            restaurant: restaurant.to_string(),
            recommendations,
            generated_at: Utc::now(),
        })
    }
}
