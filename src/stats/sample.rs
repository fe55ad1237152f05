//! Subsets of arrays: probe masks and random subsamples.

use super::percentile::{median, Summary};
use crate::error::{NormError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Values of `array` whose `mask` entry is true.
pub fn select_masked(array: &[f64], mask: &[bool]) -> Result<Vec<f64>> {
    if mask.len() != array.len() {
        return Err(NormError::LengthMismatch {
            index: 0,
            expected: array.len(),
            actual: mask.len(),
        });
    }
    let selected: Vec<f64> = array
        .iter()
        .zip(mask)
        .filter_map(|(&v, &keep)| if keep { Some(v) } else { None })
        .collect();
    if selected.is_empty() {
        return Err(NormError::InvalidInput(
            "Subset mask selects no values".to_string(),
        ));
    }
    Ok(selected)
}

/// Draw `size` values without replacement using a seeded generator.
///
/// When `size` covers the whole array, a copy of the array is returned.
pub fn subsample(values: &[f64], size: usize, seed: u64) -> Result<Vec<f64>> {
    if size == 0 {
        return Err(NormError::InvalidInput(
            "Subsample size must be positive".to_string(),
        ));
    }
    if size >= values.len() {
        return Ok(values.to_vec());
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(rand::seq::index::sample(&mut rng, values.len(), size)
        .into_iter()
        .map(|i| values[i])
        .collect())
}

/// `summary` of `values`, optionally estimated from a random subsample.
pub fn subsampled_summary(
    values: &[f64],
    summary: Summary,
    size: Option<usize>,
    seed: u64,
) -> Result<f64> {
    match size {
        Some(size) if size < values.len() => summary.compute(&subsample(values, size, seed)?),
        Some(0) => Err(NormError::InvalidInput(
            "Subsample size must be positive".to_string(),
        )),
        _ => summary.compute(values),
    }
}

/// Median of `values`, optionally estimated from a random subsample.
pub fn subsampled_median(values: &[f64], size: Option<usize>, seed: u64) -> Result<f64> {
    subsampled_summary(values, Summary::Median, size, seed)
}
