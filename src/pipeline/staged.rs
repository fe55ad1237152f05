//! Two-pass sketch quantile normalization.
//!
//! The first pass reduces every array to a sketch ([`SketchCollector`]), the
//! barrier averages the sketches into a [`TargetSketch`], and the second pass
//! maps each array onto the target ([`SketchApplier`]). Only the sketches are
//! kept between passes, so arrays may be loaded, processed and dropped one at
//! a time.
//!
//! # Example
//!
//! ```
//! use sketch_qnorm::pipeline::{SketchCollector, SketchConfig};
//! use sketch_qnorm::sketch::SketchSize;
//!
//! let mut arrays = vec![
//!     vec![1.0, 4.0, 2.0, 8.0],
//!     vec![3.0, 9.0, 6.0, 12.0],
//! ];
//!
//! let config = SketchConfig::default().with_size(SketchSize::Full);
//! let mut collector = SketchCollector::new(config);
//! for array in &arrays {
//!     collector.push(array).unwrap();
//! }
//! let applier = collector.finish().unwrap();
//! for (i, array) in arrays.iter_mut().enumerate() {
//!     applier.apply(i, array).unwrap();
//! }
//!
//! assert_eq!(arrays[0], vec![2.0, 6.5, 4.0, 10.0]);
//! assert_eq!(arrays[1], vec![2.0, 6.5, 4.0, 10.0]);
//! ```

use crate::data::TieMode;
use crate::error::{ensure_finite, NormError, Result};
use crate::sketch::{
    extract_sketch, SketchInterpolator, SketchSize, TargetScaling, TargetSketch,
};
use crate::stats::select_masked;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Sketch sizes below this draw a warning.
const SMALL_SKETCH: usize = 100;

/// Configuration for sketch quantile normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Number of points per sketch (default: auto).
    pub sketch_size: SketchSize,
    /// Tie resolution (default: rank average).
    pub tie_mode: TieMode,
    /// Hard floor for values below an array's sketch (default: 0). `None`
    /// extrapolates instead.
    pub floor: Option<f64>,
    /// Optional rescaling of the averaged target.
    pub scaling: Option<TargetScaling>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            sketch_size: SketchSize::Auto,
            tie_mode: TieMode::RankAverage,
            floor: Some(0.0),
            scaling: None,
        }
    }
}

impl SketchConfig {
    pub fn with_size(mut self, sketch_size: SketchSize) -> Self {
        self.sketch_size = sketch_size;
        self
    }

    pub fn with_tie_mode(mut self, tie_mode: TieMode) -> Self {
        self.tie_mode = tie_mode;
        self
    }

    /// Use Bioconductor's middle-rank tie handling.
    pub fn bioconductor(self) -> Self {
        self.with_tie_mode(TieMode::BioconductorMiddle)
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Extrapolate below the sketch instead of interpolating from a floor.
    pub fn without_floor(mut self) -> Self {
        self.floor = None;
        self
    }

    pub fn with_scaling(mut self, scaling: TargetScaling) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Resolve the sketch size for arrays of length `len`.
    fn resolve_size(&self, len: usize) -> Result<usize> {
        let k = self.sketch_size.resolve(len)?;
        if k < 2 {
            return Err(NormError::InvalidInput(format!(
                "Sketch normalization needs arrays of at least 2 values, got {}",
                len
            )));
        }
        Ok(k)
    }
}

fn warn_if_small(k: usize) {
    if k < SMALL_SKETCH {
        tracing::warn!(
            "Sketch size {} is below {}; normalization may be coarse",
            k,
            SMALL_SKETCH
        );
    }
}

/// Validate one array and sketch it at size `k`.
///
/// `values` must resolve to exactly `k` points under `config`, otherwise
/// arrays would contribute sketches of different lengths.
fn sketch_resolved(config: &SketchConfig, values: &[f64], k: usize, index: usize) -> Result<Vec<f64>> {
    ensure_finite(values, index)?;
    let resolved = config.resolve_size(values.len())?;
    if resolved != k {
        return Err(NormError::LengthMismatch {
            index,
            expected: k,
            actual: resolved,
        });
    }
    extract_sketch(values, k)
}

/// Validate one array and sketch it at a size no larger than its length.
fn sketch_at(values: &[f64], k: usize, index: usize) -> Result<Vec<f64>> {
    ensure_finite(values, index)?;
    extract_sketch(values, k)
}

/// Overwrite `values` through `interp`, replacing non-finite results.
fn write_normalized(interp: &SketchInterpolator, fallback: f64, values: &mut [f64]) {
    for x in values.iter_mut() {
        let y = interp.normalize(*x);
        *x = if y.is_finite() { y } else { fallback };
    }
}

/// First pass: collects one sketch per array.
#[derive(Debug, Clone)]
pub struct SketchCollector {
    config: SketchConfig,
    sketch_size: Option<usize>,
    sketches: Vec<Vec<f64>>,
}

impl SketchCollector {
    pub fn new(config: SketchConfig) -> Self {
        Self {
            config,
            sketch_size: None,
            sketches: Vec::new(),
        }
    }

    /// Sketch `array` and return its index for the second pass.
    pub fn push(&mut self, array: &[f64]) -> Result<usize> {
        self.insert_sketch(array)
    }

    /// Sketch only the elements of `array` selected by `mask`.
    pub fn push_subset(&mut self, array: &[f64], mask: &[bool]) -> Result<usize> {
        let subset = select_masked(array, mask)?;
        self.insert_sketch(&subset)
    }

    fn insert_sketch(&mut self, values: &[f64]) -> Result<usize> {
        let index = self.sketches.len();
        let k = match self.sketch_size {
            Some(k) => k,
            None => {
                let k = self.config.resolve_size(values.len())?;
                tracing::debug!("Resolved sketch size {} from {} values", k, values.len());
                warn_if_small(k);
                k
            }
        };

        let sketch = sketch_resolved(&self.config, values, k, index)?;
        self.sketch_size = Some(k);
        self.sketches.push(sketch);
        tracing::trace!("Collected sketch for array {}", index);
        Ok(index)
    }

    /// Number of arrays pushed so far.
    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    /// Sketch size in use, once the first array has been pushed.
    pub fn sketch_size(&self) -> Option<usize> {
        self.sketch_size
    }

    /// Average the collected sketches and move on to the second pass.
    pub fn finish(self) -> Result<SketchApplier> {
        if self.sketches.is_empty() {
            return Err(NormError::InvalidInput(
                "No arrays were pushed before finishing".to_string(),
            ));
        }
        let target = build_target(&self.config, &self.sketches)?;
        Ok(SketchApplier {
            config: self.config,
            target,
            sketches: self.sketches,
        })
    }
}

fn build_target(config: &SketchConfig, sketches: &[Vec<f64>]) -> Result<TargetSketch> {
    let mut target = TargetSketch::from_sketches(sketches)?;
    tracing::debug!(
        "Averaged {} sketches of {} points",
        sketches.len(),
        target.len()
    );
    if let Some(scaling) = config.scaling {
        let factor = target.scale_to(scaling.target, scaling.summary)?;
        tracing::debug!(
            "Scaled target {:?} to {} (factor {})",
            scaling.summary,
            scaling.target,
            factor
        );
    }
    Ok(target)
}

/// Second pass: maps arrays onto the target distribution.
#[derive(Debug, Clone)]
pub struct SketchApplier {
    config: SketchConfig,
    target: TargetSketch,
    sketches: Vec<Vec<f64>>,
}

impl SketchApplier {
    /// Normalize against a target computed earlier, e.g. from another batch.
    ///
    /// No sketches are held, so arrays go through
    /// [`SketchApplier::normalize_array`].
    pub fn from_target(config: SketchConfig, target: TargetSketch) -> Self {
        Self {
            config,
            target,
            sketches: Vec::new(),
        }
    }

    pub fn target(&self) -> &TargetSketch {
        &self.target
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Number of collected sketches.
    pub fn n_arrays(&self) -> usize {
        self.sketches.len()
    }

    /// Sketch collected for array `index`.
    pub fn sketch(&self, index: usize) -> Option<&[f64]> {
        self.sketches.get(index).map(Vec::as_slice)
    }

    fn interpolator_for(&self, sketch: &[f64]) -> Result<SketchInterpolator> {
        if sketch.len() != self.target.len() {
            return Err(NormError::LengthMismatch {
                index: 0,
                expected: self.target.len(),
                actual: sketch.len(),
            });
        }
        SketchInterpolator::new(
            sketch.to_vec(),
            self.target.values().to_vec(),
            self.config.tie_mode,
            self.config.floor,
        )
    }

    /// Interpolator for array `index`.
    pub fn interpolator(&self, index: usize) -> Result<SketchInterpolator> {
        let sketch = self.sketch(index).ok_or_else(|| {
            NormError::InvalidInput(format!(
                "Array index {} out of range for {} collected sketches",
                index,
                self.sketches.len()
            ))
        })?;
        self.interpolator_for(sketch)
    }

    /// Value substituted for non-finite interpolation results.
    fn fallback(&self) -> f64 {
        self.target.values()[self.target.len() - 1]
    }

    /// Normalize array `index` in place using its collected sketch.
    ///
    /// `array` is checked for non-finite values before anything is written.
    pub fn apply(&self, index: usize, array: &mut [f64]) -> Result<()> {
        ensure_finite(array, index)?;
        let interp = self.interpolator(index)?;
        write_normalized(&interp, self.fallback(), array);
        Ok(())
    }

    /// Sketch `array` and normalize it in one call.
    ///
    /// The array must resolve to the target's sketch size.
    pub fn normalize_array(&self, array: &mut [f64]) -> Result<()> {
        let sketch = sketch_resolved(&self.config, array, self.target.len(), 0)?;
        let interp = self.interpolator_for(&sketch)?;
        write_normalized(&interp, self.fallback(), array);
        Ok(())
    }

    /// Like [`SketchApplier::normalize_array`], with the sketch drawn from
    /// the elements selected by `mask`. Every element is normalized.
    pub fn normalize_array_subset(&self, array: &mut [f64], mask: &[bool]) -> Result<()> {
        ensure_finite(array, 0)?;
        let subset = select_masked(array, mask)?;
        let sketch = sketch_resolved(&self.config, &subset, self.target.len(), 0)?;
        let interp = self.interpolator_for(&sketch)?;
        write_normalized(&interp, self.fallback(), array);
        Ok(())
    }
}

/// Sketch quantile normalize in-memory arrays, returning the target used.
///
/// The sketch size is resolved from the shortest array, so arrays of
/// different lengths share one sketch size. Sketching and applying run in
/// parallel across arrays. Every array is validated and every interpolator
/// built before the first write.
pub fn normalize_sketch(arrays: &mut [Vec<f64>], config: &SketchConfig) -> Result<TargetSketch> {
    let shortest = arrays.iter().map(Vec::len).min().ok_or_else(|| {
        NormError::InvalidInput("Sketch normalization needs at least one array".to_string())
    })?;
    let k = config.resolve_size(shortest)?;
    warn_if_small(k);
    tracing::debug!(
        "Sketch normalizing {} arrays with {} points per sketch ({} ties)",
        arrays.len(),
        k,
        config.tie_mode.label()
    );

    let sketches: Vec<Vec<f64>> = arrays
        .par_iter()
        .enumerate()
        .map(|(index, array)| sketch_at(array, k, index))
        .collect::<Result<Vec<_>>>()?;

    let applier = SketchApplier {
        config: config.clone(),
        target: build_target(config, &sketches)?,
        sketches,
    };

    let interpolators: Vec<SketchInterpolator> = (0..applier.n_arrays())
        .into_par_iter()
        .map(|index| applier.interpolator(index))
        .collect::<Result<Vec<_>>>()?;

    let fallback = applier.fallback();
    arrays
        .par_iter_mut()
        .zip(interpolators.par_iter())
        .for_each(|(array, interp)| write_normalized(interp, fallback, array));

    Ok(applier.target)
}
