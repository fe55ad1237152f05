//! Piecewise-linear mapping from one array's sketch onto the target sketch.

use crate::data::{ReferenceDistribution, TieMode};
use crate::error::{ensure_finite, NormError, Result};

/// Maps raw values of one array onto the shared target distribution.
///
/// Built from the array's own sketch `s` and the target (average) sketch
/// `avg`. Values inside the sketch range are interpolated linearly between
/// neighbouring points `(s[i], avg[i])`, values that hit sketch points exactly
/// are resolved with the tie mode, and values outside the range are
/// extrapolated. With a hard floor, values below the sketch are interpolated
/// from `(floor, floor)` instead of extrapolated, which keeps outputs from
/// dropping below the floor.
///
/// The mapping is non-decreasing in its input.
#[derive(Debug, Clone)]
pub struct SketchInterpolator {
    sketch: Vec<f64>,
    target: ReferenceDistribution,
    floor: Option<f64>,
    lower_slope: f64,
    upper_slope: f64,
}

fn validate_sketch(values: &[f64], what: &str) -> Result<()> {
    if values.len() < 2 {
        return Err(NormError::InvalidInput(format!(
            "The {} needs at least 2 points, got {}",
            what,
            values.len()
        )));
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(NormError::InvalidInput(format!(
            "The {} has a non-finite value at position {}",
            what, pos
        )));
    }
    if let Some(pos) = values.windows(2).position(|w| w[1] < w[0]) {
        return Err(NormError::InvalidInput(format!(
            "The {} decreases at position {}",
            what,
            pos + 1
        )));
    }
    Ok(())
}

/// Slope between `(s[i], avg[i])` and `(s[j], avg[j])`, or 1 if the sketch
/// values coincide.
fn slope_between(sketch: &[f64], avg: &[f64], i: usize, j: usize) -> f64 {
    let run = sketch[j] - sketch[i];
    if run == 0.0 {
        1.0
    } else {
        (avg[j] - avg[i]) / run
    }
}

impl SketchInterpolator {
    /// Build an interpolator, validating both sketches.
    ///
    /// # Arguments
    /// * `sketch` - Sketch of the array being normalized
    /// * `avg` - Target sketch of the same length
    /// * `tie_mode` - Resolution for values matching several sketch points
    /// * `floor` - Hard floor for values below the sketch, usually `Some(0.0)`
    pub fn new(
        sketch: Vec<f64>,
        avg: Vec<f64>,
        tie_mode: TieMode,
        floor: Option<f64>,
    ) -> Result<Self> {
        validate_sketch(&sketch, "sketch")?;
        validate_sketch(&avg, "target sketch")?;
        if sketch.len() != avg.len() {
            return Err(NormError::LengthMismatch {
                index: 0,
                expected: avg.len(),
                actual: sketch.len(),
            });
        }
        if let Some(f) = floor {
            if !f.is_finite() {
                return Err(NormError::InvalidInput(format!(
                    "Floor must be finite, got {}",
                    f
                )));
            }
        }

        let k = sketch.len();
        let first_distinct = sketch.iter().position(|&s| s > sketch[0]);
        let last_distinct = sketch.iter().rposition(|&s| s < sketch[k - 1]);
        let lower_slope = first_distinct.map_or(1.0, |j| slope_between(&sketch, &avg, 0, j));
        let upper_slope = last_distinct.map_or(1.0, |j| slope_between(&sketch, &avg, j, k - 1));

        Ok(Self {
            sketch,
            target: ReferenceDistribution::new(avg, tie_mode)?,
            floor,
            lower_slope,
            upper_slope,
        })
    }

    /// Normalized value of `x`.
    pub fn normalize(&self, x: f64) -> f64 {
        let s = &self.sketch;
        let avg = self.target.values();
        let k = s.len();

        let lo = s.partition_point(|&v| v < x);
        let hi = s.partition_point(|&v| v <= x);

        if hi == 0 {
            return match self.floor {
                Some(floor) if s[0] <= floor => avg[0],
                Some(floor) => {
                    let theta = ((avg[0] - floor) / (s[0] - floor)).max(0.0);
                    (floor + (x - floor) * theta).min(avg[0])
                }
                None => avg[0] - (s[0] - x) * self.lower_slope,
            };
        }
        if lo == k {
            return avg[k - 1] + (x - s[k - 1]) * self.upper_slope;
        }
        if lo == hi {
            let theta = (avg[lo] - avg[lo - 1]) / (s[lo] - s[lo - 1]);
            return avg[lo - 1] + (x - s[lo - 1]) * theta;
        }
        self.target.resolve(lo..hi).unwrap_or(avg[lo])
    }

    /// Normalize every value of `values` in place.
    ///
    /// Fails with [`NormError::InvalidInput`] on an empty slice or a
    /// non-finite value, leaving `values` untouched.
    pub fn apply(&self, values: &mut [f64]) -> Result<()> {
        ensure_finite(values, 0)?;
        for x in values.iter_mut() {
            *x = self.normalize(*x);
        }
        Ok(())
    }

    pub fn sketch(&self) -> &[f64] {
        &self.sketch
    }

    pub fn target(&self) -> &[f64] {
        self.target.values()
    }

    pub fn tie_mode(&self) -> TieMode {
        self.target.tie_mode()
    }

    pub fn floor(&self) -> Option<f64> {
        self.floor
    }

    pub fn len(&self) -> usize {
        self.sketch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketch.is_empty()
    }
}

/// Build a [`SketchInterpolator`] from borrowed sketches.
pub fn build_interpolator(
    sketch: &[f64],
    avg: &[f64],
    tie_mode: TieMode,
    floor: Option<f64>,
) -> Result<SketchInterpolator> {
    SketchInterpolator::new(sketch.to_vec(), avg.to_vec(), tie_mode, floor)
}
