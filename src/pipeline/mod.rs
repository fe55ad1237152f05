//! Sketch normalization stages and configurable normalization runs.

mod runner;
mod staged;

pub use runner::{
    run_normalization, Method, NormalizationConfig, Pipeline, RunReport, StepReport,
};
pub use staged::{normalize_sketch, SketchApplier, SketchCollector, SketchConfig};
