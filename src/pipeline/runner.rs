//! Configurable normalization runs.

use crate::data::TieMode;
use crate::error::{NormError, Result};
use crate::normalize::{normalize_exact, normalize_median_with_config, MedianConfig, MedianReport};
use crate::pipeline::staged::{normalize_sketch, SketchConfig};
use crate::sketch::TargetSketch;
use serde::{Deserialize, Serialize};

/// A normalization step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Method {
    /// Exact quantile normalization; all arrays must share a length.
    QuantileExact {
        #[serde(default)]
        tie_mode: TieMode,
    },
    /// Sketch quantile normalization.
    QuantileSketch(SketchConfig),
    /// Median (or mean) scaling.
    Median(MedianConfig),
}

/// Run configuration for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Name of the run.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Steps to execute, in order.
    pub steps: Vec<Method>,
}

impl NormalizationConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(NormError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(NormError::from)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(NormError::from)
    }

    /// Save to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(NormError::from)
    }
}

/// What a step produced besides the normalized arrays.
#[derive(Debug, Clone)]
pub enum StepReport {
    QuantileExact,
    QuantileSketch { target: TargetSketch },
    Median(MedianReport),
}

/// Outcome of a [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Target of the last sketch step, if any.
    pub fn sketch_target(&self) -> Option<&TargetSketch> {
        self.steps.iter().rev().find_map(|step| match step {
            StepReport::QuantileSketch { target } => Some(target),
            _ => None,
        })
    }
}

/// Builder for normalization runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Method>,
    name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &NormalizationConfig) -> Self {
        Self {
            steps: config.steps.clone(),
            name: config.name.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Add exact quantile normalization.
    pub fn quantile_exact(mut self, tie_mode: TieMode) -> Self {
        self.steps.push(Method::QuantileExact { tie_mode });
        self
    }

    /// Add sketch quantile normalization.
    pub fn quantile_sketch(mut self, config: SketchConfig) -> Self {
        self.steps.push(Method::QuantileSketch(config));
        self
    }

    /// Add median scaling.
    pub fn median(mut self, config: MedianConfig) -> Self {
        self.steps.push(Method::Median(config));
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> NormalizationConfig {
        NormalizationConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            steps: self.steps.clone(),
        }
    }

    /// Run every step over `arrays`.
    ///
    /// Steps work on a copy that replaces `arrays` only when the whole run
    /// succeeds.
    pub fn run(&self, arrays: &mut [Vec<f64>]) -> Result<RunReport> {
        if self.steps.is_empty() {
            return Err(NormError::InvalidInput(format!(
                "Pipeline '{}' has no steps",
                self.name
            )));
        }

        let mut working = arrays.to_vec();
        let mut reports = Vec::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            tracing::debug!("Pipeline '{}' step {}: {:?}", self.name, i + 1, step);
            let report = apply_step(step, &mut working).map_err(|e| {
                NormError::Pipeline(format!("Step {} ({:?}) failed: {}", i + 1, step, e))
            })?;
            reports.push(report);
        }

        arrays.clone_from_slice(&working);
        Ok(RunReport {
            name: self.name.clone(),
            steps: reports,
        })
    }
}

fn apply_step(step: &Method, arrays: &mut [Vec<f64>]) -> Result<StepReport> {
    match step {
        Method::QuantileExact { tie_mode } => {
            normalize_exact(arrays, *tie_mode)?;
            Ok(StepReport::QuantileExact)
        }
        Method::QuantileSketch(config) => {
            let target = normalize_sketch(arrays, config)?;
            Ok(StepReport::QuantileSketch { target })
        }
        Method::Median(config) => {
            let report = normalize_median_with_config(arrays, config, None)?;
            Ok(StepReport::Median(report))
        }
    }
}

/// Run a deserialized configuration over `arrays`.
pub fn run_normalization(config: &NormalizationConfig, arrays: &mut [Vec<f64>]) -> Result<RunReport> {
    Pipeline::from_config(config).run(arrays)
}
