use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecError>;

#[derive(Debug, Error)]
pub enum RecError {
    #[error("no valid restaurant name column found; add a column named one of: {}", expected.join(", "))]
    MissingNameColumn { expected: Vec<String> },

    #[error("model has not been trained; train the model first")]
    NotTrained,

    #[error("restaurant '{0}' not found in dataset")]
    UnknownRestaurant(String),

    #[error("similarity model does not match the current dataset ({reason}); retrain the model")]
    StaleModel { reason: String },

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("empty vocabulary; the combined features contain only stop words or no words at all")]
    EmptyVocabulary,

    #[error("column '{0}' not present in dataset")]
    UnknownColumn(String),

    #[error("row {row} has {found} cells but the dataset has {expected} columns")]
    RowTooLong { row: usize, found: usize, expected: usize },

    #[error("no dataset loaded; upload a dataset first")]
    NoDataset,

    #[error("corrupt similarity artifact: {0}")]
    CorruptArtifact(String),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("training task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl RecError {
    /// True for errors the caller resolves by (re)training.
    pub fn needs_training(&self) -> bool {
        matches!(self, RecError::NotTrained | RecError::StaleModel { .. })
    }
}
