//! In-core normalization methods for multi-array intensity data.
//!
//! - **Exact quantile**: all arrays resident, every array mapped onto the
//!   averaged order statistics
//! - **Median**: linear scaling of each array to a common median or mean
//!
//! The bounded-memory quantile pathway lives in [`crate::sketch`] and
//! [`crate::pipeline`].

pub mod median;
pub mod quantile;

pub use median::{
    median_factors, normalize_median, normalize_median_with_config, MedianConfig, MedianReport,
    MedianTarget,
};
pub use quantile::{normalize_exact, quantile_target};
