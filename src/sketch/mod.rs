//! Sketch primitives for bounded-memory quantile normalization.
//!
//! A sketch is a short, non-decreasing summary of one array's distribution:
//! `K` evenly spaced order statistics. Averaging the sketches of all arrays
//! gives the target distribution, and each array is then mapped onto it by
//! piecewise-linear interpolation between its own sketch and the target.
//!
//! Only the sketches need to be held in memory at once, so arrays can be
//! streamed through the two passes one at a time (see
//! [`crate::pipeline`]).

mod average;
mod extract;
mod interpolate;

pub use average::{average_sketches, TargetScaling, TargetSketch};
pub use extract::{extract_sketch, extract_sketch_subset, SketchSize};
pub use interpolate::{build_interpolator, SketchInterpolator};
