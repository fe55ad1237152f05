//! Quantile and sketch-based normalization of multi-array intensity data.
//!
//! Measurements of the same targets collected on several instruments
//! ("arrays") rarely share a distribution. This library transforms each
//! array so that all of them do.
//!
//! # Overview
//!
//! - **data**: Rank groups, prefix-sum tables and tie policies
//! - **stats**: Medians, percentiles and seeded subsampling
//! - **normalize**: Exact quantile and median normalization, all arrays in memory
//! - **sketch**: Sketch extraction, averaging and interpolation
//! - **pipeline**: Two-pass sketch normalization and configurable runs
//!
//! Exact normalization holds every array at once. Sketch normalization only
//! keeps a short summary of each array between its two passes, so arrays can
//! be streamed one at a time.
//!
//! # Example
//!
//! ```
//! use sketch_qnorm::prelude::*;
//!
//! let mut arrays = vec![
//!     vec![1.0, 2.0, 3.0, 3.0, 3.0, 4.0, 5.0, 6.0, 7.0],
//!     vec![2.0, 4.0, 6.0, 8.0, 8.0, 8.0, 8.0, 12.0, 14.0],
//!     vec![3.0, 6.0, 9.0, 12.0, 12.0, 12.0, 15.0, 18.0, 21.0],
//! ];
//!
//! let report = Pipeline::new()
//!     .name("affy-compatible")
//!     .quantile_exact(TieMode::BioconductorMiddle)
//!     .run(&mut arrays)
//!     .unwrap();
//!
//! assert_eq!(report.steps.len(), 1);
//! assert_eq!(arrays[0][0], 2.0);
//! assert_eq!(arrays[2][8], 14.0);
//! ```

pub mod data;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod sketch;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::TieMode;
    pub use crate::error::{NormError, Result};
    pub use crate::normalize::{
        median_factors, normalize_exact, normalize_median, normalize_median_with_config,
        quantile_target, MedianConfig, MedianReport, MedianTarget,
    };
    pub use crate::pipeline::{
        normalize_sketch, run_normalization, Method, NormalizationConfig, Pipeline, RunReport,
        SketchApplier, SketchCollector, SketchConfig, StepReport,
    };
    pub use crate::sketch::{
        average_sketches, build_interpolator, extract_sketch, extract_sketch_subset,
        SketchInterpolator, SketchSize, TargetScaling, TargetSketch,
    };
    pub use crate::stats::Summary;
}
