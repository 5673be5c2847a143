use crate::algorithms::stopwords::is_english_stop_word;
use crate::config::VectorizerConfig;
use crate::error::{RecError, Result};
use nalgebra::DMatrix;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Tokens are runs of at least two word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// TF-IDF vectorizer over raw term counts with smoothed idf and L2-normalized rows.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    lowercase: bool,
    stop_words: bool,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            lowercase: true,
            stop_words: false,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self::new()
            .with_lowercase(config.lowercase)
            .with_english_stop_words(config.english_stop_words)
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_english_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&i| self.idf[i])
    }

    pub fn tokenize(&self, document: &str) -> Vec<String> {
        let text = if self.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        TOKEN_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| !(self.stop_words && is_english_stop_word(token)))
            .map(str::to_string)
            .collect()
    }

    /// Learns the vocabulary and document frequencies of `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let terms: BTreeSet<String> = self.tokenize(document.as_ref()).into_iter().collect();
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(RecError::EmptyVocabulary);
        }

        let n_docs = documents.len() as f64;
        self.vocabulary.clear();
        self.idf.clear();
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            self.vocabulary.insert(term, index);
        }

        Ok(())
    }

    /// Maps documents to a `documents × vocabulary` matrix. Unknown terms are ignored;
    /// documents without known terms map to the zero row.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(documents.len(), self.vocabulary.len());

        for (row, document) in documents.iter().enumerate() {
            for token in self.tokenize(document.as_ref()) {
                if let Some(&col) = self.vocabulary.get(&token) {
                    matrix[(row, col)] += 1.0;
                }
            }

            for (col, idf) in self.idf.iter().enumerate() {
                matrix[(row, col)] *= idf;
            }

            let norm = matrix.row(row).norm();
            if norm > 0.0 {
                matrix.row_mut(row).unscale_mut(norm);
            }
        }

        matrix
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<DMatrix<f64>> {
        self.fit(documents)?;
        Ok(self.transform(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let vectorizer = TfidfVectorizer::new().with_english_stop_words(true);
        assert_eq!(
            vectorizer.tokenize("North Indian, Chinese  BTM Casual Dining"),
            vec!["north", "indian", "chinese", "btm", "casual", "dining"]
        );
        // single characters and stop words are dropped
        assert_eq!(vectorizer.tokenize("Italian X the cafe"), vec!["italian", "cafe"]);
        assert!(vectorizer.tokenize("  ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_case_when_asked() {
        let vectorizer = TfidfVectorizer::new().with_lowercase(false);
        assert_eq!(vectorizer.tokenize("Thai Diner"), vec!["Thai", "Diner"]);
    }

    #[test]
    fn test_smoothed_idf() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["thai diner", "thai cafe", "italian cafe"]).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 4);
        // df = 2 of 3 documents
        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("thai").unwrap() - expected).abs() < 1e-12);
        // df = 1
        let expected = (4.0f64 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("diner").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::new().with_english_stop_words(true);
        let matrix = vectorizer
            .fit_transform(&["thai diner thai", "the", "italian cafe"])
            .unwrap();
        assert!((matrix.row(0).norm() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.row(1).norm(), 0.0);
        assert!((matrix.row(2).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_vocabulary() {
        let mut vectorizer = TfidfVectorizer::new().with_english_stop_words(true);
        let err = vectorizer.fit(&["the and", "  ", "a"]).unwrap_err();
        assert!(matches!(err, RecError::EmptyVocabulary));
    }
}
