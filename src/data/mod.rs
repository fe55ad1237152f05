//! Core value types shared by every normalizer.

mod partial_sums;
mod rank_groups;
mod tie_mode;

pub use partial_sums::{PartialSums, ReferenceDistribution};
pub use rank_groups::{RankGroup, RankGroups};
pub use tie_mode::TieMode;

pub(crate) use rank_groups::{cmp_f64, middle_rank};
