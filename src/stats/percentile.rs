//! Order statistics and location summaries.

use crate::data::cmp_f64;
use crate::error::{NormError, Result};
use serde::{Deserialize, Serialize};

/// Location statistic used to summarise an array or a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    #[default]
    Median,
    Mean,
}

impl Summary {
    /// Compute this summary over `values`.
    pub fn compute(&self, values: &[f64]) -> Result<f64> {
        match self {
            Summary::Median => median(values),
            Summary::Mean => mean(values),
        }
    }
}

/// Value at `pct` (0-100) of `values`, reordering the slice as it goes.
///
/// The target position is `(n - 1) * pct / 100`. When it falls between two
/// order statistics their mean is returned.
pub fn percentile_in_place(values: &mut [f64], pct: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(NormError::InvalidInput(
            "Cannot take a percentile of an empty slice".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&pct) {
        return Err(NormError::InvalidInput(format!(
            "Percentile must be between 0 and 100, got {}",
            pct
        )));
    }

    let position = (values.len() - 1) as f64 * pct / 100.0;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;

    let (_, lower_value, above) = values.select_nth_unstable_by(lower, cmp_f64);
    let lower_value = *lower_value;
    if upper == lower {
        return Ok(lower_value);
    }

    // The next order statistic is the minimum of the upper partition.
    let upper_value = above.iter().copied().fold(f64::INFINITY, f64::min);
    Ok((lower_value + upper_value) / 2.0)
}

/// Value at `pct` (0-100) of `values` without modifying them.
pub fn percentile(values: &[f64], pct: f64) -> Result<f64> {
    let mut copy = values.to_vec();
    percentile_in_place(&mut copy, pct)
}

/// Median of `values`.
pub fn median(values: &[f64]) -> Result<f64> {
    percentile(values, 50.0)
}

/// Arithmetic mean of `values`, accumulated in `f64`.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(NormError::InvalidInput(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }
    let sum: f64 = values.iter().sum();
    if !sum.is_finite() {
        return Err(NormError::NumericOverflow(
            "Sum exceeded the f64 range while computing a mean".to_string(),
        ));
    }
    Ok(sum / values.len() as f64)
}
