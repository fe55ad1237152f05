//! Tie-resolution policies shared by exact and sketch normalization.

use serde::{Deserialize, Serialize};

/// How a run of identical values is mapped onto the reference distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieMode {
    /// Every tied value gets the mean of the reference values its ranks span.
    #[default]
    RankAverage,
    /// Every tied value gets the reference value at the middle rank, matching
    /// `normalize.quantiles` from the Bioconductor affy package.
    BioconductorMiddle,
}

impl TieMode {
    /// Map a Bioconductor-compatibility flag onto a mode.
    pub fn from_bioconductor(compat: bool) -> Self {
        if compat {
            TieMode::BioconductorMiddle
        } else {
            TieMode::RankAverage
        }
    }

    /// True when ties resolve to the middle rank.
    pub fn is_bioconductor(&self) -> bool {
        matches!(self, TieMode::BioconductorMiddle)
    }

    /// Short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            TieMode::RankAverage => "rank-average",
            TieMode::BioconductorMiddle => "bioconductor-middle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rank_average() {
        assert_eq!(TieMode::default(), TieMode::RankAverage);
    }

    #[test]
    fn test_from_bioconductor() {
        assert!(TieMode::from_bioconductor(true).is_bioconductor());
        assert!(!TieMode::from_bioconductor(false).is_bioconductor());
    }

    #[test]
    fn test_labels() {
        assert_eq!(TieMode::RankAverage.label(), "rank-average");
        assert_eq!(TieMode::BioconductorMiddle.label(), "bioconductor-middle");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TieMode::BioconductorMiddle).unwrap();
        assert_eq!(json, "\"bioconductor_middle\"");
        let parsed: TieMode = serde_json::from_str("\"rank_average\"").unwrap();
        assert_eq!(parsed, TieMode::RankAverage);
    }
}
