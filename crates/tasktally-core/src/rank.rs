//! Rang scoring and the weighted next-task recommendation.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::summary::Summary;

/// Stand-in for a total of exactly zero, keeping the logarithm finite.
pub const ZERO_TIME_FLOOR: f64 = 0.001;

/// Priority-weighted score of a code given its rolled-up hours.
///
/// Falls as logged time grows and scales with priority; never negative.
pub fn rang(total_time: f64, priority: f64) -> f64 {
    let time = if total_time == 0.0 {
        ZERO_TIME_FLOOR
    } else {
        total_time
    };
    let score = (10.0 - time.ln()) * 1.5 * priority;
    if score < 0.0 {
        0.0
    } else {
        score
    }
}

/// A leaf task and its normalized share of the draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub task: String,
    pub weight: f64,
}

/// Draws the next task among the leaves of a summary.
pub struct Recommender {
    rng: Mcg128Xsl64,
}

impl Recommender {
    /// Seeded for reproducible draws, or from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }

    /// Leaf tasks with their rang normalized to sum to one.
    pub fn weights(summary: &Summary) -> Result<Vec<Weight>> {
        let leaves: Vec<_> = summary.leaves().collect();
        let sum: f64 = leaves.iter().map(|row| row.rang).sum();
        if leaves.is_empty() || sum <= 0.0 || !sum.is_finite() {
            return Err(CoreError::EmptyRecommendationPool);
        }
        Ok(leaves
            .into_iter()
            .map(|row| Weight {
                task: row.task.clone(),
                weight: row.rang / sum,
            })
            .collect())
    }

    /// One weighted draw; returns the task name.
    pub fn recommend(&mut self, summary: &Summary) -> Result<String> {
        let weights = Self::weights(summary)?;
        let dist = WeightedIndex::new(weights.iter().map(|w| w.weight))
            .map_err(|_| CoreError::EmptyRecommendationPool)?;
        let pick = dist.sample(&mut self.rng);
        Ok(weights[pick].task.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_time_uses_floor() {
        let expected = (10.0 - ZERO_TIME_FLOOR.ln()) * 1.5 * 2.0;
        assert!((rang(0.0, 2.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn large_totals_clamp_to_zero() {
        // ln(e^10) == 10, anything above scores negative before clamping.
        assert_eq!(rang(30_000.0, 1.0), 0.0);
        assert!(rang(1.0, 1.0) > 0.0);
        assert!((rang(1.0, 1.0) - 15.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn non_increasing_in_time(
            a in ZERO_TIME_FLOOR..50_000.0,
            b in ZERO_TIME_FLOOR..50_000.0,
            p in 0.01f64..10.0
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rang(lo, p) >= rang(hi, p));
        }

        #[test]
        fn non_decreasing_in_priority(
            t in 0.0f64..50_000.0,
            a in 0.01f64..10.0,
            b in 0.01f64..10.0
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rang(t, lo) <= rang(t, hi));
        }
    }
}
