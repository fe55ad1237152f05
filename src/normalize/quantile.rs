//! Exact quantile normalization.
//!
//! Every array is sorted, the order statistics are averaged across arrays,
//! and each element is replaced by the averaged value at its rank. Afterwards
//! all arrays share one distribution.
//!
//! # Ties
//!
//! An array holding the same value at several ranks needs one output value
//! for all of them:
//!
//! - [`TieMode::RankAverage`] assigns the mean of the averaged distribution
//!   over the tied ranks, computed in O(1) from a prefix-sum table.
//! - [`TieMode::BioconductorMiddle`] assigns the averaged value at the middle
//!   rank, as `normalize.quantiles` in Bioconductor's affy package does.
//!
//! # Example
//!
//! ```
//! use sketch_qnorm::data::TieMode;
//! use sketch_qnorm::normalize::normalize_exact;
//!
//! let mut arrays = vec![vec![1.0, 3.0, 2.0], vec![20.0, 10.0, 30.0]];
//! normalize_exact(&mut arrays, TieMode::RankAverage).unwrap();
//! assert_eq!(arrays[0], vec![5.5, 16.5, 11.0]);
//! assert_eq!(arrays[1], vec![11.0, 5.5, 16.5]);
//! ```

use crate::data::{RankGroups, ReferenceDistribution, TieMode};
use crate::error::{ensure_finite, NormError, Result};
use rayon::prelude::*;

/// Check that `arrays` is a non-empty set of equal-length finite arrays and
/// return the shared length.
fn validate_arrays(arrays: &[Vec<f64>]) -> Result<usize> {
    let first = arrays.first().ok_or_else(|| {
        NormError::InvalidInput("Quantile normalization needs at least one array".to_string())
    })?;
    let len = first.len();
    if len == 0 {
        return Err(NormError::InvalidInput(
            "Cannot quantile normalize zero-length arrays".to_string(),
        ));
    }
    for (index, array) in arrays.iter().enumerate() {
        if array.len() != len {
            return Err(NormError::LengthMismatch {
                index,
                expected: len,
                actual: array.len(),
            });
        }
        ensure_finite(array, index)?;
    }
    Ok(len)
}

/// Mean of the `r`-th order statistic across arrays, for every rank `r`.
fn averaged_order_statistics(groups: &[RankGroups], len: usize) -> Result<Vec<f64>> {
    let mut reference = vec![0.0f64; len];
    for rank_groups in groups {
        for (acc, &v) in reference.iter_mut().zip(rank_groups.sorted()) {
            *acc += v;
        }
    }

    let n_arrays = groups.len() as f64;
    for acc in reference.iter_mut() {
        if !acc.is_finite() {
            return Err(NormError::NumericOverflow(
                "Order statistic sum exceeded the f64 range".to_string(),
            ));
        }
        *acc /= n_arrays;
    }
    Ok(reference)
}

/// The distribution every array is mapped onto: the mean of the sorted
/// arrays, rank by rank.
///
/// This is the exact-path counterpart of an average sketch.
pub fn quantile_target(arrays: &[Vec<f64>]) -> Result<Vec<f64>> {
    let len = validate_arrays(arrays)?;
    let groups: Vec<RankGroups> = arrays
        .par_iter()
        .map(|array| RankGroups::from_values(array))
        .collect();
    averaged_order_statistics(&groups, len)
}

/// Quantile normalize `arrays` in place.
///
/// All arrays must be non-empty, finite and of identical length. Validation
/// and every fallible computation happen before the first write, so on error
/// the arrays are left untouched.
///
/// # Arguments
/// * `arrays` - One entry per array; mutated in place
/// * `tie_mode` - How tied values are resolved
pub fn normalize_exact(arrays: &mut [Vec<f64>], tie_mode: TieMode) -> Result<()> {
    let len = validate_arrays(arrays)?;

    let groups: Vec<RankGroups> = arrays
        .par_iter()
        .map(|array| RankGroups::from_values(array))
        .collect();

    let reference = ReferenceDistribution::new(averaged_order_statistics(&groups, len)?, tie_mode)?;

    // One output value per tie group, per array.
    let group_values: Vec<Vec<f64>> = groups
        .par_iter()
        .map(|rank_groups| {
            rank_groups
                .groups()
                .iter()
                .map(|group| reference.resolve(group.ranks.clone()))
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    arrays
        .par_iter_mut()
        .zip(groups.par_iter().zip(group_values.par_iter()))
        .for_each(|(array, (rank_groups, values))| {
            for x in array.iter_mut() {
                if let Some(idx) = rank_groups.group_index(*x) {
                    *x = values[idx];
                }
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn doc_example() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 2.0, 3.0, 3.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            vec![2.0, 4.0, 6.0, 8.0, 8.0, 8.0, 8.0, 12.0, 14.0],
            vec![3.0, 6.0, 9.0, 12.0, 12.0, 12.0, 15.0, 18.0, 21.0],
        ]
    }

    fn round1(values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v * 10.0).round() / 10.0).collect()
    }

    #[test]
    fn test_doc_example_rank_average() {
        let mut data = doc_example();
        normalize_exact(&mut data, TieMode::RankAverage).unwrap();

        assert_eq!(
            round1(&data[0]),
            vec![2.0, 4.0, 7.1, 7.1, 7.1, 8.0, 9.3, 12.0, 14.0]
        );
        assert_eq!(
            round1(&data[1]),
            vec![2.0, 4.0, 6.0, 8.2, 8.2, 8.2, 8.2, 12.0, 14.0]
        );
        assert_eq!(
            round1(&data[2]),
            vec![2.0, 4.0, 6.0, 7.8, 7.8, 7.8, 9.3, 12.0, 14.0]
        );
    }

    #[test]
    fn test_doc_example_bioconductor() {
        let mut data = doc_example();
        normalize_exact(&mut data, TieMode::BioconductorMiddle).unwrap();

        assert_eq!(
            round1(&data[0]),
            vec![2.0, 4.0, 7.7, 7.7, 7.7, 8.0, 9.3, 12.0, 14.0]
        );
        assert_eq!(
            round1(&data[1]),
            vec![2.0, 4.0, 6.0, 7.7, 7.7, 7.7, 7.7, 12.0, 14.0]
        );
        assert_eq!(
            round1(&data[2]),
            vec![2.0, 4.0, 6.0, 7.7, 7.7, 7.7, 9.3, 12.0, 14.0]
        );
    }

    #[test]
    fn test_unsorted_input_keeps_ranks() {
        let mut data = vec![vec![3.0, 1.0, 2.0], vec![10.0, 30.0, 20.0]];
        normalize_exact(&mut data, TieMode::RankAverage).unwrap();

        // Order statistics average to [5.5, 11, 16.5].
        assert_eq!(data[0], vec![16.5, 5.5, 11.0]);
        assert_eq!(data[1], vec![5.5, 16.5, 11.0]);
    }

    #[test]
    fn test_single_array_is_unchanged() {
        let mut data = vec![vec![4.0, 1.0, 9.0, 1.0]];
        normalize_exact(&mut data, TieMode::BioconductorMiddle).unwrap();
        assert_eq!(data[0], vec![4.0, 1.0, 9.0, 1.0]);
    }

    #[test]
    fn test_quantile_target() {
        let target = quantile_target(&doc_example()).unwrap();
        assert_eq!(target.len(), 9);
        assert_relative_eq!(target[0], 2.0);
        assert_relative_eq!(target[3], 23.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(target[8], 14.0);
    }

    #[test]
    fn test_length_mismatch_leaves_data_untouched() {
        let mut data = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]];
        let result = normalize_exact(&mut data, TieMode::RankAverage);

        assert!(matches!(
            result,
            Err(NormError::LengthMismatch {
                index: 1,
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(data[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(data[1], vec![4.0, 5.0]);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let mut none: Vec<Vec<f64>> = vec![];
        assert!(normalize_exact(&mut none, TieMode::RankAverage)
            .unwrap_err()
            .is_invalid_input());

        let mut zero_len: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(normalize_exact(&mut zero_len, TieMode::RankAverage)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn test_non_finite_rejected_before_mutation() {
        let mut data = vec![vec![1.0, 2.0], vec![3.0, f64::NAN]];
        assert!(normalize_exact(&mut data, TieMode::RankAverage).is_err());
        assert_eq!(data[0], vec![1.0, 2.0]);
    }
}
