pub mod codec;

use crate::algorithms::SimilarityMatrix;
use crate::config::{Config, StorageBackend};
use crate::error::Result;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// The persisted output of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredModel {
    pub fingerprint: u64,
    pub matrix: SimilarityMatrix,
}

/// Single overwritable slot holding the latest similarity matrix.
#[async_trait::async_trait]
pub trait MatrixStore: Send + Sync {
    /// Replaces any previously stored model. Readers never see a partial write.
    async fn save(&self, model: &StoredModel) -> Result<()>;
    async fn load(&self) -> Result<Option<StoredModel>>;
    async fn clear(&self) -> Result<()>;
}

pub fn store_from_config(config: &Config) -> Arc<dyn MatrixStore> {
    match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryMatrixStore::new()),
        StorageBackend::File => Arc::new(FileMatrixStore::new(&config.storage.path)),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMatrixStore {
    slot: RwLock<Option<Arc<StoredModel>>>,
}

impl InMemoryMatrixStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MatrixStore for InMemoryMatrixStore {
    async fn save(&self, model: &StoredModel) -> Result<()> {
        let model = Arc::new(model.clone());
        *self.slot.write() = Some(model);
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredModel>> {
        let model = self.slot.read().clone();
        Ok(model.map(|m| m.as_ref().clone()))
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write() = None;
        Ok(())
    }
}

/// Stores the artifact at a fixed path. Writes go to a temporary sibling file
/// that is then renamed over the artifact.
#[derive(Debug, Clone)]
pub struct FileMatrixStore {
    path: PathBuf,
}

impl FileMatrixStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "similarity".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

#[async_trait::async_trait]
impl MatrixStore for FileMatrixStore {
    async fn save(&self, model: &StoredModel) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        let bytes = codec::encode(model);
        if let Err(e) = tokio::fs::write(&temp, &bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        info!(
            "Saved {}x{} similarity matrix to {}",
            model.matrix.size(),
            model.matrix.size(),
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredModel>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => codec::decode(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No similarity artifact at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(fingerprint: u64) -> StoredModel {
        StoredModel {
            fingerprint,
            matrix: SimilarityMatrix::from_row_major(1, vec![1.0]).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryMatrixStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&model(1)).await.unwrap();
        store.save(&model(2)).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().fingerprint, 2);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMatrixStore::new(dir.path().join("models").join("similarity.bin"));
        assert!(store.load().await.unwrap().is_none());

        store.save(&model(1)).await.unwrap();
        store.save(&model(2)).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(model(2)));

        // no temporary files left behind
        let entries = std::fs::read_dir(dir.path().join("models")).unwrap().count();
        assert_eq!(entries, 1);

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
