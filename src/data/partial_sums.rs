//! Prefix sums over a reference distribution and tie resolution against it.

use super::{middle_rank, TieMode};
use crate::error::{NormError, Result};
use std::ops::Range;

/// Running sums with a leading zero sentinel.
///
/// Entry `i` holds the sum of the first `i` values, so the sum over the
/// half-open rank range `a..b` is `sums[b] - sums[a]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSums {
    sums: Vec<f64>,
}

impl PartialSums {
    /// Accumulate `values` into a prefix-sum table of length `values.len() + 1`.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mut sums = Vec::with_capacity(values.len() + 1);
        let mut acc = 0.0f64;
        sums.push(acc);
        for &v in values {
            acc += v;
            sums.push(acc);
        }
        if !acc.is_finite() {
            return Err(NormError::NumericOverflow(
                "Partial sums exceeded the f64 range".to_string(),
            ));
        }
        Ok(Self { sums })
    }

    /// Number of entries, including the sentinel.
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// True only for a table built from nothing (just the sentinel).
    pub fn is_empty(&self) -> bool {
        self.sums.len() <= 1
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.sums[self.sums.len() - 1]
    }

    /// Sum over `ranks`.
    pub fn range_sum(&self, ranks: Range<usize>) -> f64 {
        self.sums[ranks.end] - self.sums[ranks.start]
    }

    /// Mean over `ranks`.
    pub fn range_mean(&self, ranks: Range<usize>) -> Result<f64> {
        if ranks.is_empty() {
            return Err(NormError::DivideByZero(format!(
                "Empty rank range {}..{}",
                ranks.start, ranks.end
            )));
        }
        if ranks.end >= self.sums.len() {
            return Err(NormError::InvalidInput(format!(
                "Rank range {}..{} exceeds distribution of {} values",
                ranks.start,
                ranks.end,
                self.sums.len() - 1
            )));
        }
        let width = ranks.len() as f64;
        Ok(self.range_sum(ranks) / width)
    }

    /// The raw table.
    pub fn as_slice(&self) -> &[f64] {
        &self.sums
    }
}

/// A non-decreasing reference distribution that tied ranks resolve against.
///
/// Exact normalization uses the averaged order statistics, sketch
/// interpolation uses the average sketch. Both resolve a tie range the same
/// way so the two pathways agree.
#[derive(Debug, Clone)]
pub struct ReferenceDistribution {
    values: Vec<f64>,
    partial_sums: Option<PartialSums>,
    tie_mode: TieMode,
}

impl ReferenceDistribution {
    /// Wrap `values`, building the prefix sums when `tie_mode` needs them.
    pub fn new(values: Vec<f64>, tie_mode: TieMode) -> Result<Self> {
        let partial_sums = match tie_mode {
            TieMode::RankAverage => Some(PartialSums::from_values(&values)?),
            TieMode::BioconductorMiddle => None,
        };
        Ok(Self {
            values,
            partial_sums,
            tie_mode,
        })
    }

    /// Reference values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Active tie policy.
    pub fn tie_mode(&self) -> TieMode {
        self.tie_mode
    }

    /// Number of reference values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no reference values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The single value shared by every element whose ranks fall in `ranks`.
    pub fn resolve(&self, ranks: Range<usize>) -> Result<f64> {
        if ranks.is_empty() {
            return Err(NormError::DivideByZero(format!(
                "Tie group {}..{} has no ranks",
                ranks.start, ranks.end
            )));
        }
        if ranks.end > self.values.len() {
            return Err(NormError::InvalidInput(format!(
                "Tie group {}..{} exceeds distribution of {} values",
                ranks.start,
                ranks.end,
                self.values.len()
            )));
        }
        match &self.partial_sums {
            Some(sums) => sums.range_mean(ranks),
            None => Ok(self.values[middle_rank(&ranks)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_sums_sentinel() {
        let ps = PartialSums::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ps.as_slice(), &[0.0, 1.0, 3.0, 6.0]);
        assert_eq!(ps.len(), 4);
        assert_eq!(ps.total(), 6.0);
        assert_eq!(ps.range_sum(1..3), 5.0);
    }

    #[test]
    fn test_range_mean() {
        let ps = PartialSums::from_values(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_relative_eq!(ps.range_mean(0..4).unwrap(), 5.0);
        assert_relative_eq!(ps.range_mean(2..3).unwrap(), 6.0);
        assert!(matches!(
            ps.range_mean(2..2),
            Err(NormError::DivideByZero(_))
        ));
        assert!(ps.range_mean(3..5).is_err());
    }

    #[test]
    fn test_overflow_detected() {
        let result = PartialSums::from_values(&[f64::MAX, f64::MAX]);
        assert!(matches!(result, Err(NormError::NumericOverflow(_))));
    }

    #[test]
    fn test_resolve_rank_average() {
        // Averaged order statistics from the three-array example.
        let reference = vec![2.0, 4.0, 6.0, 23.0 / 3.0, 23.0 / 3.0, 8.0, 28.0 / 3.0, 12.0, 14.0];
        let dist = ReferenceDistribution::new(reference, TieMode::RankAverage).unwrap();

        // Ranks 2..5 -> (6 + 23/3 + 23/3) / 3
        assert_relative_eq!(dist.resolve(2..5).unwrap(), 64.0 / 9.0, epsilon = 1e-12);
        // Ranks 3..7 -> (23/3 + 23/3 + 8 + 28/3) / 4
        assert_relative_eq!(dist.resolve(3..7).unwrap(), 98.0 / 12.0, epsilon = 1e-12);
        // Singletons resolve to themselves.
        assert_relative_eq!(dist.resolve(5..6).unwrap(), 8.0);
    }

    #[test]
    fn test_resolve_bioconductor_middle() {
        let reference = vec![2.0, 4.0, 6.0, 23.0 / 3.0, 23.0 / 3.0, 8.0, 28.0 / 3.0, 12.0, 14.0];
        let dist = ReferenceDistribution::new(reference, TieMode::BioconductorMiddle).unwrap();

        assert_relative_eq!(dist.resolve(2..5).unwrap(), 23.0 / 3.0);
        // Even-sized group picks the lower middle rank (3..7 -> rank 4).
        assert_relative_eq!(dist.resolve(3..7).unwrap(), 23.0 / 3.0);
        assert_relative_eq!(dist.resolve(8..9).unwrap(), 14.0);
    }

    #[test]
    fn test_middle_resolves_at_group_middle() {
        use crate::data::RankGroups;

        let rg = RankGroups::from_values(&[3.0, 1.0, 3.0, 3.0, 2.0, 3.0, 2.0]);
        let reference = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0];
        let dist = ReferenceDistribution::new(reference.clone(), TieMode::BioconductorMiddle).unwrap();

        for group in rg.groups() {
            assert_eq!(dist.resolve(group.ranks.clone()).unwrap(), reference[group.middle()]);
        }
        // 2.0 holds ranks 1..3, 3.0 holds ranks 3..7.
        assert_eq!(dist.resolve(1..3).unwrap(), 2.0);
        assert_eq!(dist.resolve(3..7).unwrap(), 16.0);
    }

    #[test]
    fn test_resolve_rejects_bad_ranges() {
        let dist = ReferenceDistribution::new(vec![1.0, 2.0], TieMode::BioconductorMiddle).unwrap();
        assert!(matches!(dist.resolve(1..1), Err(NormError::DivideByZero(_))));
        assert!(dist.resolve(1..3).is_err());
    }
}
