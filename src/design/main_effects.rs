//! Main effects calculation.
//!
//! Calculates the mean response at each level of each factor directly from
//! the experiment table, without fitting a model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ExperimentTable;
use crate::error::{Error, Result};

/// Main effect of a single factor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MainEffect {
    /// Factor name.
    pub factor: String,
    /// Distinct levels of the factor, ascending.
    pub levels: Vec<f64>,
    /// Mean response at each level.
    pub level_means: Vec<f64>,
    /// Effect at each level (level_mean - grand_mean).
    pub level_effects: Vec<f64>,
    /// Range of level means (max - min).
    pub range: f64,
    /// Half the difference between the high and low level means.
    ///
    /// Only defined for two-level factors. For an orthogonal two-level design
    /// this equals the least-squares coefficient of the factor.
    pub half_effect: Option<f64>,
    /// Rank by importance (1 = most important).
    pub rank: usize,
}

/// Calculate main effects for the named factors.
///
/// # Arguments
/// * `table` - The experiment
/// * `response` - Name of the response column
/// * `factors` - Names of the factor columns to summarize
///
/// # Algorithm
/// For each factor:
/// 1. Group runs by their level for this factor
/// 2. Calculate mean response at each level
/// 3. Calculate effect = level_mean - grand_mean
/// 4. Calculate range = max(level_means) - min(level_means)
/// 5. Rank factors by range (descending)
///
/// # Errors
///
/// Returns [`Error::UnknownFactor`] if a column does not exist and
/// [`Error::InvalidParams`] if the table has no runs.
pub fn main_effects<S: AsRef<str>>(
    table: &ExperimentTable,
    response: &str,
    factors: &[S],
) -> Result<Vec<MainEffect>> {
    let y = table.require(response)?;
    if y.is_empty() {
        return Err(Error::invalid_params("experiment has no runs"));
    }
    let grand_mean = y.sum() / y.len() as f64;

    let mut effects: Vec<MainEffect> = Vec::with_capacity(factors.len());

    for name in factors {
        let name = name.as_ref();
        let factor = table
            .factor(name)
            .ok_or_else(|| Error::unknown_factor(name, table.names()))?;
        let levels = factor.distinct_levels();

        // Sum responses for each level
        let mut level_sums: Vec<f64> = vec![0.0; levels.len()];
        let mut level_counts: Vec<usize> = vec![0; levels.len()];

        for (&level, &response) in factor.levels().iter().zip(y.iter()) {
            if let Some(idx) = levels.iter().position(|&l| l == level) {
                level_sums[idx] += response;
                level_counts[idx] += 1;
            }
        }

        let level_means: Vec<f64> = level_sums
            .iter()
            .zip(level_counts.iter())
            .map(|(&sum, &count)| sum / count as f64)
            .collect();

        let level_effects: Vec<f64> = level_means.iter().map(|m| m - grand_mean).collect();

        let min_mean = level_means.iter().copied().fold(f64::INFINITY, f64::min);
        let max_mean = level_means
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let half_effect = match level_means.as_slice() {
            [low, high] => Some((high - low) / 2.0),
            _ => None,
        };

        effects.push(MainEffect {
            factor: name.to_string(),
            levels,
            level_means,
            level_effects,
            range: max_mean - min_mean,
            half_effect,
            rank: 0, // Will be set after sorting
        });
    }

    // Rank factors by range (higher range = more important = lower rank)
    let mut ranges: Vec<(usize, f64)> = effects
        .iter()
        .enumerate()
        .map(|(i, e)| (i, e.range))
        .collect();
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, (idx, _)) in ranges.iter().enumerate() {
        effects[*idx].rank = rank + 1;
    }

    Ok(effects)
}
