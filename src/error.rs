//! Error types for the sketch-qnorm library.

use thiserror::Error;

/// Main error type for the library.
///
/// Every fallible operation validates its input before touching caller data,
/// so receiving an error means no array was modified.
#[derive(Error, Debug)]
pub enum NormError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Arrays, sketches or masks that must share a length do not.
    #[error("Length mismatch at index {index}: expected {expected}, got {actual}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Division by zero: {0}")]
    DivideByZero(String),

    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NormError {
    /// True for every variant that signals malformed caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            NormError::InvalidInput(_) | NormError::LengthMismatch { .. }
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, NormError>;

/// Reject empty or non-finite arrays.
pub(crate) fn ensure_finite(values: &[f64], index: usize) -> Result<()> {
    if values.is_empty() {
        return Err(NormError::InvalidInput(format!("Array {} is empty", index)));
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(NormError::InvalidInput(format!(
            "Array {} has a non-finite value at position {}",
            index, pos
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(NormError::InvalidInput("x".into()).is_invalid_input());
        assert!(NormError::LengthMismatch {
            index: 1,
            expected: 3,
            actual: 2
        }
        .is_invalid_input());
        assert!(!NormError::DivideByZero("median".into()).is_invalid_input());
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[1.0, 2.0], 0).is_ok());
        assert!(ensure_finite(&[], 0).is_err());
        assert!(ensure_finite(&[1.0, f64::NAN], 0).is_err());
        assert!(ensure_finite(&[f64::INFINITY], 0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = NormError::LengthMismatch {
            index: 2,
            expected: 9,
            actual: 8,
        };
        assert_eq!(
            err.to_string(),
            "Length mismatch at index 2: expected 9, got 8"
        );
    }
}
