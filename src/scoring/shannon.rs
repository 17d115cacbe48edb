//! Shannon diversity index over race/ethnicity groups.
//!
//! `H = -Σ p_i ln(p_i)`, taken over groups with a non-zero share. The index is
//! scaled to 0–10 by its maximum for five groups, `ln(5)`.

use serde::Serialize;

use crate::error::{Result, ScoringError};
use crate::scoring::normalize::MAX_SCORE;

/// Number of mutually exclusive population groups.
pub const GROUPS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationCounts {
    pub white: u64,
    pub black: u64,
    pub asian: u64,
    pub other: u64,
    pub two_or_more: u64,
}

impl PopulationCounts {
    pub fn as_array(&self) -> [u64; GROUPS] {
        [
            self.white,
            self.black,
            self.asian,
            self.other,
            self.two_or_more,
        ]
    }

    /// Sum of the group counts, or `None` if it overflows `u64`.
    pub fn sum(&self) -> Option<u64> {
        self.as_array().iter().try_fold(0u64, |acc, &c| acc.checked_add(c))
    }

    /// Share of `total` in each group, as a percentage.
    pub fn percentages(&self, total: u64) -> [f64; GROUPS] {
        self.as_array().map(|c| {
            if total == 0 {
                0.0
            } else {
                c as f64 / total as f64 * 100.0
            }
        })
    }
}

/// Computes the Shannon index `H` of `counts` against a population base.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidPopulation`] if `total` is zero, smaller
/// than the sum of the group counts, or the group counts overflow.
pub fn shannon_index(counts: &PopulationCounts, total: u64) -> Result<f64> {
    if total == 0 {
        return Err(ScoringError::InvalidPopulation {
            total,
            reason: "population base is zero",
        });
    }
    let Some(sum) = counts.sum() else {
        return Err(ScoringError::InvalidPopulation {
            total,
            reason: "group counts overflow",
        });
    };
    if sum > total {
        return Err(ScoringError::InvalidPopulation {
            total,
            reason: "group counts exceed the population base",
        });
    }

    let h = counts
        .as_array()
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.ln()
        })
        .sum::<f64>();

    Ok(h)
}

/// Scales an index to 0–10 by the five-group maximum `ln(5)`.
pub fn diversity_score(h: f64) -> f64 {
    let max_h = (GROUPS as f64).ln();
    (h / max_h * MAX_SCORE).clamp(0.0, MAX_SCORE)
}
