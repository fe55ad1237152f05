//! Averaging sketches into the shared target distribution.

use crate::error::{NormError, Result};
use crate::stats::Summary;
use serde::{Deserialize, Serialize};

/// Position-wise mean of equal-length sketches.
///
/// Accumulates in `f64` and divides once at the end. The mean of
/// non-decreasing sketches is itself non-decreasing.
pub fn average_sketches(sketches: &[Vec<f64>]) -> Result<Vec<f64>> {
    let first = sketches.first().ok_or_else(|| {
        NormError::InvalidInput("Cannot average an empty set of sketches".to_string())
    })?;
    let k = first.len();
    if k == 0 {
        return Err(NormError::InvalidInput("Sketches are empty".to_string()));
    }

    let mut sums = vec![0.0f64; k];
    for (index, sketch) in sketches.iter().enumerate() {
        if sketch.len() != k {
            return Err(NormError::LengthMismatch {
                index,
                expected: k,
                actual: sketch.len(),
            });
        }
        for (acc, &v) in sums.iter_mut().zip(sketch) {
            *acc += v;
        }
    }

    if sums.iter().any(|s| !s.is_finite()) {
        return Err(NormError::NumericOverflow(
            "Sketch sum exceeded the f64 range".to_string(),
        ));
    }
    let n = sketches.len() as f64;
    Ok(sums.into_iter().map(|s| s / n).collect())
}

/// Rescale the target so its median (or mean) equals `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScaling {
    pub target: f64,
    #[serde(default)]
    pub summary: Summary,
}

impl TargetScaling {
    /// Scale the target's median to `target`.
    pub fn median(target: f64) -> Self {
        Self {
            target,
            summary: Summary::Median,
        }
    }

    /// Scale the target's mean to `target`.
    pub fn mean(target: f64) -> Self {
        Self {
            target,
            summary: Summary::Mean,
        }
    }
}

/// The distribution every array is normalized onto.
///
/// Always finite, non-decreasing and at least two points long. It can be
/// computed from one batch of arrays, serialized with serde, and reused to
/// normalize later batches against the same reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TargetSketch {
    values: Vec<f64>,
}

impl TargetSketch {
    /// Wrap an existing average sketch after validating it.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() < 2 {
            return Err(NormError::InvalidInput(format!(
                "A target sketch needs at least 2 points, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(NormError::InvalidInput(
                "Target sketch holds a non-finite value".to_string(),
            ));
        }
        if let Some(pos) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(NormError::InvalidInput(format!(
                "Target sketch decreases at position {}",
                pos + 1
            )));
        }
        Ok(Self { values })
    }

    /// Average a set of per-array sketches into a target.
    pub fn from_sketches(sketches: &[Vec<f64>]) -> Result<Self> {
        Self::new(average_sketches(sketches)?)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Median or mean of the target values.
    pub fn summary(&self, summary: Summary) -> Result<f64> {
        summary.compute(&self.values)
    }

    /// Multiply the target so its `summary` equals `target`, returning the
    /// factor applied.
    ///
    /// Both `target` and the current summary must be positive, so the
    /// factor is positive and the target stays non-decreasing.
    pub fn scale_to(&mut self, target: f64, summary: Summary) -> Result<f64> {
        if !target.is_finite() || target <= 0.0 {
            return Err(NormError::InvalidInput(format!(
                "Scaling target must be positive and finite, got {}",
                target
            )));
        }
        let current = self.summary(summary)?;
        if current == 0.0 {
            return Err(NormError::DivideByZero(format!(
                "Target sketch has a {:?} of zero",
                summary
            )));
        }
        if current < 0.0 {
            return Err(NormError::InvalidInput(format!(
                "Target sketch has a negative {:?}: {}",
                summary, current
            )));
        }

        let factor = target / current;
        for v in self.values.iter_mut() {
            *v *= factor;
        }
        Ok(factor)
    }
}

impl TryFrom<Vec<f64>> for TargetSketch {
    type Error = NormError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<TargetSketch> for Vec<f64> {
    fn from(target: TargetSketch) -> Self {
        target.values
    }
}
