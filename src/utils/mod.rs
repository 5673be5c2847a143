use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub mod validation;

/// Indices of the `k` highest scores, skipping `exclude`.
///
/// The sort is stable, so equal scores keep their original order.
pub fn rank_indices_excluding(scores: &[f64], exclude: usize, k: usize) -> Vec<usize> {
    let mut indexed_scores: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .map(|(i, &score)| (i, score))
        .collect();

    indexed_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    indexed_scores
        .into_iter()
        .filter(|&(i, _)| i != exclude)
        .take(k)
        .map(|(i, _)| i)
        .collect()
}

/// Hashes the row-aligned name values and combined features of a dataset.
///
/// Any change in row count, row order, names or feature text changes the result.
pub fn fingerprint<'a, N, F>(names: N, features: F) -> u64
where
    N: IntoIterator<Item = Option<String>>,
    F: IntoIterator<Item = &'a str>,
{
    let mut hasher = DefaultHasher::new();
    let mut rows = 0usize;
    for (name, feature) in names.into_iter().zip(features) {
        name.hash(&mut hasher);
        feature.hash(&mut hasher);
        rows += 1;
    }
    rows.hash(&mut hasher);
    hasher.finish()
}
