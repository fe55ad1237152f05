//! Sketch extraction: a fixed number of evenly spaced order statistics.

use crate::data::cmp_f64;
use crate::error::{ensure_finite, NormError, Result};
use crate::stats::select_masked;
use serde::{Deserialize, Serialize};

/// How many points a sketch keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchSize {
    /// `min(50_000, L)` points.
    #[default]
    Auto,
    /// One point per element; the sketch is the sorted array.
    Full,
    /// `min(k, L)` points.
    Fixed(usize),
}

impl SketchSize {
    /// Upper bound used by [`SketchSize::Auto`].
    pub const AUTO_MAX: usize = 50_000;

    /// Sketch size for arrays of length `len`.
    pub fn resolve(&self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(NormError::InvalidInput(
                "Cannot size a sketch for an empty array".to_string(),
            ));
        }
        let k = match *self {
            SketchSize::Auto => Self::AUTO_MAX.min(len),
            SketchSize::Full => len,
            SketchSize::Fixed(k) if k < 2 => {
                return Err(NormError::InvalidInput(format!(
                    "Sketch size must be at least 2, got {}",
                    k
                )))
            }
            SketchSize::Fixed(k) => k.min(len),
        };
        Ok(k)
    }
}

/// Sample `k` points from already sorted values.
fn sketch_sorted(sorted: &[f64], k: usize) -> Vec<f64> {
    let len = sorted.len();
    let k = k.min(len);
    if k == 1 {
        return vec![sorted[0]];
    }

    let span = (len - 1) as u64;
    let steps = (k - 1) as u64;
    (0..k as u64)
        .map(|i| {
            let id1 = (i * span / steps) as usize;
            let id2 = ((i * span + steps - 1) / steps) as usize;
            (sorted[id1] + sorted[id2]) / 2.0
        })
        .collect()
}

/// Extract a sketch of `k` points from `array`.
///
/// Sorts a copy once and takes `min(k, L)` evenly spaced order statistics.
/// A point that falls between two ranks is the mean of its neighbours. The
/// first point is the array minimum and the last is the maximum, and the
/// sketch is non-decreasing.
///
/// # Errors
/// `InvalidInput` if `k < 2`, the array is empty, or it holds a non-finite
/// value.
pub fn extract_sketch(array: &[f64], k: usize) -> Result<Vec<f64>> {
    if k < 2 {
        return Err(NormError::InvalidInput(format!(
            "Sketch size must be at least 2, got {}",
            k
        )));
    }
    ensure_finite(array, 0)?;

    let mut sorted = array.to_vec();
    sorted.sort_unstable_by(cmp_f64);
    Ok(sketch_sorted(&sorted, k))
}

/// Extract a sketch from the elements of `array` selected by `mask`.
pub fn extract_sketch_subset(array: &[f64], mask: &[bool], k: usize) -> Result<Vec<f64>> {
    let subset = select_masked(array, mask)?;
    extract_sketch(&subset, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// -10..=100 with odd and even halves interleaved.
    fn interleaved() -> Vec<f64> {
        let mut values = Vec::new();
        for i in (-10..=100).step_by(2) {
            values.push(i as f64);
        }
        for i in (-9..=100).step_by(2) {
            values.push(i as f64);
        }
        values
    }

    #[test]
    fn test_endpoints_are_min_and_max() {
        let data = interleaved();
        for k in 2..20 {
            let sketch = extract_sketch(&data, k).unwrap();
            assert_eq!(sketch.len(), k);
            assert_eq!(sketch[0], -10.0);
            assert_eq!(sketch[k - 1], 100.0);
            assert!(sketch.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_full_size_is_sorted_copy() {
        let data = vec![5.0, 3.0, 9.0, 1.0];
        assert_eq!(extract_sketch(&data, 4).unwrap(), vec![1.0, 3.0, 5.0, 9.0]);
        assert_eq!(extract_sketch(&data, 10).unwrap(), vec![1.0, 3.0, 5.0, 9.0]);
    }

    #[test]
    fn test_between_ranks_averages() {
        // L = 4, K = 3: positions 0, 1.5, 3.
        let data = vec![0.0, 10.0, 20.0, 30.0];
        assert_eq!(extract_sketch(&data, 3).unwrap(), vec![0.0, 15.0, 30.0]);
    }

    #[test]
    fn test_single_element_array() {
        assert_eq!(extract_sketch(&[7.0], 5).unwrap(), vec![7.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(extract_sketch(&[1.0, 2.0], 1).unwrap_err().is_invalid_input());
        assert!(extract_sketch(&[], 4).unwrap_err().is_invalid_input());
        assert!(extract_sketch(&[1.0, f64::INFINITY], 2).is_err());
    }

    #[test]
    fn test_subset_sketch() {
        let data = vec![1.0, 100.0, 2.0, 200.0, 3.0];
        let mask = vec![true, false, true, false, true];
        assert_eq!(
            extract_sketch_subset(&data, &mask, 3).unwrap(),
            vec![1.0, 2.0, 3.0]
        );
        assert!(extract_sketch_subset(&data, &mask[..3], 3).is_err());
    }

    #[test]
    fn test_sketch_size_resolution() {
        assert_eq!(SketchSize::Auto.resolve(1_000).unwrap(), 1_000);
        assert_eq!(SketchSize::Auto.resolve(80_000).unwrap(), 50_000);
        assert_eq!(SketchSize::Full.resolve(80_000).unwrap(), 80_000);
        assert_eq!(SketchSize::Fixed(500).resolve(200).unwrap(), 200);
        assert_eq!(SketchSize::Fixed(500).resolve(2_000).unwrap(), 500);
        assert!(SketchSize::Fixed(1).resolve(10).is_err());
        assert!(SketchSize::Auto.resolve(0).is_err());
    }
}
