//! Sorted copy of one array with its runs of tied values.

use std::cmp::Ordering;
use std::ops::Range;

/// A maximal run of equal values in sorted order.
///
/// `ranks` is half-open: a value occupying sorted positions 2, 3 and 4 has
/// `ranks == 2..5`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankGroup {
    /// The shared value.
    pub value: f64,
    /// Sorted positions holding `value`.
    pub ranks: Range<usize>,
}

impl RankGroup {
    /// Number of tied elements.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Always false; groups are built from at least one element.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// True when more than one element shares the value.
    pub fn is_tie(&self) -> bool {
        self.ranks.len() > 1
    }

    /// The middle rank, rounding down for even-sized groups.
    pub fn middle(&self) -> usize {
        middle_rank(&self.ranks)
    }
}

/// Middle of a non-empty half-open rank range, rounding down.
pub(crate) fn middle_rank(ranks: &Range<usize>) -> usize {
    (ranks.start + ranks.end - 1) / 2
}

/// Ascending copy of an array plus the tie groups found in one scan.
///
/// The original array is never reordered. Values are expected to be finite;
/// callers validate before building.
#[derive(Debug, Clone)]
pub struct RankGroups {
    sorted: Vec<f64>,
    groups: Vec<RankGroup>,
}

pub(crate) fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

impl RankGroups {
    /// Sort a copy of `values` and group consecutive equal entries.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(cmp_f64);

        let mut groups = Vec::new();
        let mut start = 0;
        while start < sorted.len() {
            let value = sorted[start];
            let mut end = start + 1;
            while end < sorted.len() && sorted[end] == value {
                end += 1;
            }
            groups.push(RankGroup {
                value,
                ranks: start..end,
            });
            start = end;
        }

        Self { sorted, groups }
    }

    /// The sorted copy.
    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    /// Tie groups in ascending value order.
    pub fn groups(&self) -> &[RankGroup] {
        &self.groups
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when built from an empty array.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Number of distinct values.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Index into [`groups`](Self::groups) of the group holding `value`.
    pub fn group_index(&self, value: f64) -> Option<usize> {
        self.groups
            .binary_search_by(|g| cmp_f64(&g.value, &value))
            .ok()
    }

    /// The group holding `value`, if the array contains it.
    pub fn group_of(&self, value: f64) -> Option<&RankGroup> {
        self.group_index(value).map(|i| &self.groups[i])
    }
}
