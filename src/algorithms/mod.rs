pub mod columns;
pub mod features;
pub mod similarity;
pub mod stopwords;
pub mod tfidf;

pub use columns::{detect_column, resolve_columns};
pub use features::combined_features;
pub use similarity::{cosine_similarity, SimilarityMatrix};
pub use tfidf::TfidfVectorizer;
