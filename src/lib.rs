pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecError, Result};
pub use models::*;

use algorithms::resolve_columns;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The currently loaded dataset together with its detected columns.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dataset: Dataset,
    pub detection: ColumnDetection,
}

/// What a caller is shown after loading a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub detected: ColumnDetection,
    pub assignment: Option<ColumnAssignment>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn services::storage::MatrixStore>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
    pub training_service: Arc<services::training::TrainingService>,
    pub workspace: Arc<RwLock<Option<Arc<Workspace>>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let store = services::storage::store_from_config(&config);

        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::new(store.clone(), config.clone())
        );

        let training_service = Arc::new(
            services::training::TrainingService::new(store.clone(), config.clone())
        );

        Self {
            config,
            store,
            recommendation_service,
            training_service,
            workspace: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the current dataset and reports the detected columns. The dataset
    /// is kept even when no name column was found so the caller can inspect it.
    pub async fn load_dataset(&self, dataset: Dataset) -> (ColumnReport, Result<ColumnAssignment>) {
        let detection = resolve_columns(dataset.columns(), &self.config.columns);
        let assignment = detection.assignment(&self.config.columns);

        match &assignment {
            Ok(assignment) => info!("Restaurant name column detected: {}", assignment.name),
            Err(e) => warn!("Dataset loaded without a usable name column: {}", e),
        }

        let report = ColumnReport {
            rows: dataset.len(),
            columns: dataset.columns().to_vec(),
            detected: detection.clone(),
            assignment: assignment.as_ref().ok().cloned(),
        };

        *self.workspace.write().await = Some(Arc::new(Workspace { dataset, detection }));
        (report, assignment)
    }

    async fn current(&self) -> Result<(Arc<Workspace>, ColumnAssignment)> {
        let workspace = self.workspace.read().await.clone().ok_or(RecError::NoDataset)?;
        let assignment = workspace.detection.assignment(&self.config.columns)?;
        Ok((workspace, assignment))
    }

    pub async fn column_report(&self) -> Result<ColumnReport> {
        let workspace = self.workspace.read().await.clone().ok_or(RecError::NoDataset)?;
        Ok(ColumnReport {
            rows: workspace.dataset.len(),
            columns: workspace.dataset.columns().to_vec(),
            detected: workspace.detection.clone(),
            assignment: workspace.detection.assignment(&self.config.columns).ok(),
        })
    }

    pub async fn train(&self) -> Result<TrainingReport> {
        let (workspace, assignment) = self.current().await?;
        self.training_service.train(&workspace.dataset, &assignment).await
    }

    pub async fn restaurants(&self) -> Result<Vec<String>> {
        let (workspace, assignment) = self.current().await?;
        self.recommendation_service.list_restaurants(&workspace.dataset, &assignment)
    }

    pub async fn recommend(&self, restaurant: &str) -> Result<RecommendationResponse> {
        let (workspace, assignment) = self.current().await?;
        self.recommendation_service
            .recommend(&workspace.dataset, &assignment, restaurant)
            .await
    }

    /// Drops the stored similarity matrix; the loaded dataset is kept.
    pub async fn reset_model(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Similarity model cleared");
        Ok(())
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
