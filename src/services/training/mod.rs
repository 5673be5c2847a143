use crate::algorithms::features::{check_assignment, combined_features};
use crate::algorithms::{SimilarityMatrix, TfidfVectorizer};
use crate::config::Config;
use crate::error::Result;
use crate::models::*;
use crate::services::storage::{MatrixStore, StoredModel};
use crate::utils::{fingerprint, validation::validate_dataset};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

/// Output of the in-memory part of training, before persistence.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: StoredModel,
    pub vocabulary_size: usize,
}

/// Rebuilds the similarity matrix from scratch on every call.
pub struct TrainingService {
    store: Arc<dyn MatrixStore>,
    config: Arc<Config>,
    train_lock: Mutex<()>,
}

impl TrainingService {
    pub fn new(store: Arc<dyn MatrixStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            train_lock: Mutex::new(()),
        }
    }

    /// Vectorizes the combined features, computes all-pairs similarity and
    /// replaces the stored matrix.
    pub async fn train(&self, dataset: &Dataset, assignment: &ColumnAssignment) -> Result<TrainingReport> {
        validate_dataset(dataset)?;
        check_assignment(dataset, assignment)?;

        let _guard = self.train_lock.lock().await;
        let started = Instant::now();
        info!("Training similarity model on {} rows", dataset.len());

        let features = combined_features(dataset, assignment)?;
        let fingerprint = dataset_fingerprint(dataset, assignment, &features)?;
        let mut vectorizer = TfidfVectorizer::from_config(&self.config.vectorizer);

        let trained = tokio::task::spawn_blocking(move || -> Result<TrainedModel> {
            let tfidf = vectorizer.fit_transform(features.as_slice())?;
            Ok(TrainedModel {
                model: StoredModel {
                    fingerprint,
                    matrix: SimilarityMatrix::from_features(&tfidf),
                },
                vocabulary_size: vectorizer.vocabulary_size(),
            })
        })
        .await??;

        self.store.save(&trained.model).await?;

        let report = TrainingReport {
            rows: trained.model.matrix.size(),
            vocabulary_size: trained.vocabulary_size,
            fingerprint,
            duration_ms: started.elapsed().as_millis() as u64,
            trained_at: Utc::now(),
        };
        info!(
            "Model training completed: {} rows, {} terms in {}ms",
            report.rows, report.vocabulary_size, report.duration_ms
        );
        Ok(report)
    }
}

/// Fingerprint of everything training reads from a dataset.
pub fn dataset_fingerprint(
    dataset: &Dataset,
    assignment: &ColumnAssignment,
    features: &[String],
) -> Result<u64> {
    let names = dataset.column_values(&assignment.name)?.map(CellValue::as_text);
    Ok(fingerprint(names, features.iter().map(String::as_str)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecError;
    use crate::services::storage::InMemoryMatrixStore;

    fn assignment() -> ColumnAssignment {
        ColumnAssignment {
            name: "name".to_string(),
            cuisine: "cuisine".to_string(),
            location: "location".to_string(),
            rest_type: "rest_type".to_string(),
        }
    }

    fn service() -> (TrainingService, Arc<InMemoryMatrixStore>) {
        let store = Arc::new(InMemoryMatrixStore::new());
        let service = TrainingService::new(store.clone(), Arc::new(Config::in_memory()));
        (service, store)
    }

    #[tokio::test]
    async fn test_train_persists_matrix() {
        let (service, store) = service();
        let dataset = Dataset::new(["name", "cuisine", "location", "rest_type"])
            .with_row(["A", "Italian", "Indiranagar", "Cafe"])
            .unwrap()
            .with_row(["B", "Thai", "Koramangala", "Diner"])
            .unwrap();

        let report = service.train(&dataset, &assignment()).await.unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.vocabulary_size, 6);

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.fingerprint, report.fingerprint);
        assert_eq!(stored.matrix.size(), 2);
        assert_eq!(stored.matrix.get(0, 1), 0.0);
    }

    #[tokio::test]
    async fn test_train_rejects_empty_dataset() {
        let (service, store) = service();
        let dataset = Dataset::new(["name", "cuisine", "location", "rest_type"]);
        let err = service.train(&dataset, &assignment()).await.unwrap_err();
        assert!(matches!(err, RecError::EmptyDataset));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_train_rejects_stop_word_corpus() {
        let (service, _) = service();
        let dataset = Dataset::new(["name", "cuisine", "location", "rest_type"])
            .with_row([Some("A"), Some("the"), None, Some("a")])
            .unwrap();
        let err = service.train(&dataset, &assignment()).await.unwrap_err();
        assert!(matches!(err, RecError::EmptyVocabulary));
    }
}
