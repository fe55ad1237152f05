//! Median (or mean) scaling normalization.
//!
//! Each array is multiplied by `target / summary(array)` so that every array
//! ends up with the same median (or mean). This is a linear and much cheaper
//! alternative to quantile normalization: the shape of each distribution is
//! preserved, only its scale changes.

use crate::error::{ensure_finite, NormError, Result};
use crate::stats::{mean, median, select_masked, subsampled_summary, Summary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the common summary value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianTarget {
    /// Scale every array to this value.
    Fixed(f64),
    /// Use the median (or mean) of the per-array summaries.
    Computed,
}

/// Configuration for median normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedianConfig {
    /// Statistic matched across arrays (default: median).
    pub summary: Summary,
    /// Common value to scale to (default: computed from the arrays).
    pub target: MedianTarget,
    /// Estimate each array's summary (median or mean) from this many
    /// randomly drawn values.
    pub subsample: Option<usize>,
    /// Seed for subsampling.
    pub seed: u64,
}

impl Default for MedianConfig {
    fn default() -> Self {
        Self {
            summary: Summary::Median,
            target: MedianTarget::Computed,
            subsample: None,
            seed: 42,
        }
    }
}

impl MedianConfig {
    /// Scale every array's median to `target`.
    pub fn with_target(target: f64) -> Self {
        Self {
            target: MedianTarget::Fixed(target),
            ..Default::default()
        }
    }

    /// Match means instead of medians.
    pub fn mean(mut self) -> Self {
        self.summary = Summary::Mean;
        self
    }

    /// Estimate summaries from `size` sampled values.
    pub fn subsample(mut self, size: usize) -> Self {
        self.subsample = Some(size);
        self
    }
}

/// Scaling applied by median normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianReport {
    /// Summary value of each array before scaling.
    pub summaries: Vec<f64>,
    /// The common target value.
    pub target: f64,
    /// Multiplier applied to each array.
    pub scale_factors: Vec<f64>,
}

fn array_summary(values: &[f64], config: &MedianConfig, index: usize) -> Result<f64> {
    let seed = config.seed.wrapping_add(index as u64);
    let summary = subsampled_summary(values, config.summary, config.subsample, seed)?;
    if summary == 0.0 {
        return Err(NormError::DivideByZero(format!(
            "Array {} has a {:?} of zero",
            index, config.summary
        )));
    }
    if summary < 0.0 {
        return Err(NormError::InvalidInput(format!(
            "Array {} has a negative {:?}: {}",
            index, config.summary, summary
        )));
    }
    Ok(summary)
}

/// Compute per-array scale factors without modifying anything.
///
/// # Arguments
/// * `arrays` - Arrays to summarise; lengths may differ
/// * `config` - Summary, target and subsampling options
/// * `mask` - Optional subset of positions used for the summaries. Must have
///   the same length as every array.
pub fn median_factors(
    arrays: &[Vec<f64>],
    config: &MedianConfig,
    mask: Option<&[bool]>,
) -> Result<MedianReport> {
    if arrays.is_empty() {
        return Err(NormError::InvalidInput(
            "Median normalization needs at least one array".to_string(),
        ));
    }
    if let MedianTarget::Fixed(target) = config.target {
        if !target.is_finite() || target <= 0.0 {
            return Err(NormError::InvalidInput(format!(
                "Target must be positive and finite, got {}",
                target
            )));
        }
    }

    let summaries: Vec<f64> = arrays
        .par_iter()
        .enumerate()
        .map(|(index, array)| {
            ensure_finite(array, index)?;
            match mask {
                Some(mask) => {
                    let subset = select_masked(array, mask).map_err(|e| match e {
                        NormError::LengthMismatch {
                            expected, actual, ..
                        } => NormError::LengthMismatch {
                            index,
                            expected,
                            actual,
                        },
                        other => other,
                    })?;
                    array_summary(&subset, config, index)
                }
                None => array_summary(array, config, index),
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    let target = match config.target {
        MedianTarget::Fixed(target) => target,
        MedianTarget::Computed => match config.summary {
            Summary::Median => median(&summaries)?,
            Summary::Mean => mean(&summaries)?,
        },
    };

    let scale_factors = summaries.iter().map(|&s| target / s).collect();

    Ok(MedianReport {
        summaries,
        target,
        scale_factors,
    })
}

/// Median normalize `arrays` in place with full configuration.
///
/// Every summary is computed before the first array is scaled, so a failing
/// array leaves all arrays untouched.
pub fn normalize_median_with_config(
    arrays: &mut [Vec<f64>],
    config: &MedianConfig,
    mask: Option<&[bool]>,
) -> Result<MedianReport> {
    let report = median_factors(arrays, config, mask)?;

    arrays
        .par_iter_mut()
        .zip(report.scale_factors.par_iter())
        .for_each(|(array, &factor)| {
            for x in array.iter_mut() {
                *x *= factor;
            }
        });

    Ok(report)
}

/// Scale each array in place so its median equals `target`.
///
/// # Arguments
/// * `arrays` - Arrays to scale; lengths may differ
/// * `target` - Median every array is scaled to
/// * `subsample` - Estimate each median from this many sampled values
///
/// # Errors
/// [`NormError::DivideByZero`] when an array's median is exactly zero.
pub fn normalize_median(
    arrays: &mut [Vec<f64>],
    target: f64,
    subsample: Option<usize>,
) -> Result<()> {
    let config = MedianConfig {
        subsample,
        ..MedianConfig::with_target(target)
    };
    normalize_median_with_config(arrays, &config, None).map(|_| ())
}
