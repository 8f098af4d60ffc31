//! Statement coverage aggregation.

use crate::block::Block;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Covered and total statement counts for one file or a set of files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCoverageStat {
    /// Statements in blocks with at least one hit
    pub covered_statements: u64,
    /// All statements
    pub total_statements: u64,
}

impl FileCoverageStat {
    /// Count statements over `blocks`
    #[must_use]
    pub fn from_blocks(blocks: &[Block]) -> Self {
        blocks.iter().fold(Self::default(), |stat, block| Self {
            covered_statements: stat.covered_statements
                + if block.is_covered() {
                    block.statements()
                } else {
                    0
                },
            total_statements: stat.total_statements + block.statements(),
        })
    }

    /// Coverage percentage in [0, 100]; 0 when there are no statements
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total_statements == 0 {
            return 0.0;
        }
        self.covered_statements as f64 / self.total_statements as f64 * 100.0
    }

    /// Whether any statements were counted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_statements == 0
    }
}

impl Add for FileCoverageStat {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            covered_statements: self.covered_statements + other.covered_statements,
            total_statements: self.total_statements + other.total_statements,
        }
    }
}

impl Sum for FileCoverageStat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Statement coverage percentage of `blocks`
#[must_use]
pub fn coverage_percent(blocks: &[Block]) -> f64 {
    FileCoverageStat::from_blocks(blocks).percent()
}
