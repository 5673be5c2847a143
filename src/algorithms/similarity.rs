use crate::error::{RecError, Result};
use crate::utils::rank_indices_excluding;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Dense, symmetric all-pairs cosine similarity matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    // row-major
    values: Vec<f64>,
}

/// Cosine of the angle between `a` and `b`; 0 when either vector is zero.
pub fn cosine_similarity(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (a.dot(b) / (norm_a * norm_b)).min(1.0)
    }
}

impl SimilarityMatrix {
    /// Computes pairwise similarities between the rows of `features`.
    pub fn from_features(features: &DMatrix<f64>) -> Self {
        let rows: Vec<DVector<f64>> = features
            .row_iter()
            .map(|row| row.transpose())
            .collect();
        let size = rows.len();

        let values: Vec<f64> = (0..size)
            .into_par_iter()
            .flat_map_iter(|i| {
                let rows = &rows;
                (0..size).map(move |j| {
                    // same operand order for (i, j) and (j, i) keeps the matrix exactly symmetric
                    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
                    cosine_similarity(&rows[lo], &rows[hi])
                })
            })
            .collect();

        Self { size, values }
    }

    pub fn from_row_major(size: usize, values: Vec<f64>) -> Result<Self> {
        if size.checked_mul(size) != Some(values.len()) {
            return Err(RecError::CorruptArtifact(format!(
                "expected {size}x{size} values, found {}",
                values.len()
            )));
        }
        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Up to `k` most similar other rows as (index, score), best first.
    /// Ties keep the original index order.
    pub fn nearest(&self, index: usize, k: usize) -> Vec<(usize, f64)> {
        let row = self.row(index);
        rank_indices_excluding(row, index, k)
            .into_iter()
            .map(|j| (j, row[j]))
            .collect()
    }
}
