//! Selection strategies
//!
//! - **FirstMatch**: stop at the first rule with a nonzero score, no ranking.
//! - **BestMatches**: keep only the rules tied at the highest score.
//! - **AllMatches**: keep every rule with a nonzero score.
//!
//! For the two accumulating strategies a candidate set with more than one rule is
//! resolved randomly: uniformly when every weight is `1.0`, otherwise with probability
//! proportional to each rule's weight.

use crate::error::SiftError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy deciding which matching rules become candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    FirstMatch,
    #[default]
    BestMatches,
    AllMatches,
}

impl SelectionStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::FirstMatch => "first_match",
            SelectionStrategy::BestMatches => "best_matches",
            SelectionStrategy::AllMatches => "all_matches",
        }
    }

    /// Whether the strategy accumulates a candidate set
    pub const fn collects_candidates(&self) -> bool {
        !matches!(self, SelectionStrategy::FirstMatch)
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_match" => Ok(SelectionStrategy::FirstMatch),
            "best_matches" => Ok(SelectionStrategy::BestMatches),
            "all_matches" => Ok(SelectionStrategy::AllMatches),
            other => Err(SiftError::configuration(
                "strategy",
                format!("unknown selection strategy '{other}'"),
            )),
        }
    }
}
