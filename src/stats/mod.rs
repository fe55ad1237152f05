//! Summary statistics used by the normalizers.

mod percentile;
mod sample;

pub use percentile::{mean, median, percentile, percentile_in_place, Summary};
pub use sample::{select_masked, subsample, subsampled_median, subsampled_summary};
