//! Full-factorial expansion.
//!
//! Generates every combination of the given factor levels as an
//! [`ExperimentTable`]. The row ordering is fixed by the caller's factor
//! sequence and the chosen [`GridOrder`], never by map iteration order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ExperimentTable;
use crate::error::{Error, Result};
use crate::factor::Factor;

/// Row ordering of an expanded grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridOrder {
    /// The leftmost factor varies slowest, the rightmost fastest.
    ///
    /// For two-level factors `A, B`: `(-,-), (-,+), (+,-), (+,+)`.
    #[default]
    LeftmostSlowest,
    /// Standard (Yates) order: the leftmost factor varies fastest.
    ///
    /// For two-level factors `A, B`: `(-,-), (+,-), (-,+), (+,+)`.
    /// This is the order in which textbook response vectors are listed.
    Standard,
}

/// Expand factors with arbitrary level lists into all level combinations.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] if no factors are given, a factor has no
/// levels, or the number of combinations overflows, and
/// [`Error::DuplicateFactor`] if a name is repeated.
///
/// # Example
///
/// ```
/// use factorial::{expand_grid, GridOrder};
///
/// let table = expand_grid(
///     &[("C", [-1.0, 1.0]), ("T", [-1.0, 1.0]), ("S", [-1.0, 1.0])],
///     GridOrder::Standard,
/// )
/// .unwrap();
///
/// assert_eq!(table.runs(), 8);
/// assert_eq!(table.column("C").unwrap().to_vec(), vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
/// ```
pub fn expand_grid<S, L>(factors: &[(S, L)], order: GridOrder) -> Result<ExperimentTable>
where
    S: AsRef<str>,
    L: AsRef<[f64]>,
{
    if factors.is_empty() {
        return Err(Error::invalid_params("at least one factor is required"));
    }

    let mut runs: usize = 1;
    for (name, levels) in factors {
        let count = levels.as_ref().len();
        if count == 0 {
            return Err(Error::invalid_params(format!(
                "factor '{}' has no levels",
                name.as_ref()
            )));
        }
        runs = runs.checked_mul(count).ok_or_else(|| {
            Error::invalid_params(format!("{} factors produce too many runs", factors.len()))
        })?;
    }

    // Number of consecutive rows that share one level of each factor.
    let mut strides = vec![1usize; factors.len()];
    match order {
        GridOrder::LeftmostSlowest => {
            for j in (0..factors.len().saturating_sub(1)).rev() {
                strides[j] = strides[j + 1] * factors[j + 1].1.as_ref().len();
            }
        }
        GridOrder::Standard => {
            for j in 1..factors.len() {
                strides[j] = strides[j - 1] * factors[j - 1].1.as_ref().len();
            }
        }
    }

    let columns = factors
        .iter()
        .zip(&strides)
        .map(|((name, levels), &stride)| {
            let levels = levels.as_ref();
            let values: Vec<f64> = (0..runs)
                .map(|run| levels[(run / stride) % levels.len()])
                .collect();
            Factor::coded(name.as_ref(), &values)
        });

    ExperimentTable::gather(columns)
}

/// All 2^k combinations of two-level factors, leftmost factor varying slowest.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] if a factor's two levels are equal or
/// not finite. Otherwise the same as [`expand_grid`].
///
/// # Example
///
/// ```
/// use factorial::full_factorial_grid;
///
/// let table = full_factorial_grid(&[("A", (-1.0, 1.0)), ("B", (-1.0, 1.0))]).unwrap();
///
/// assert_eq!(table.column("A").unwrap().to_vec(), vec![-1.0, -1.0, 1.0, 1.0]);
/// assert_eq!(table.column("B").unwrap().to_vec(), vec![-1.0, 1.0, -1.0, 1.0]);
/// ```
pub fn full_factorial_grid<S: AsRef<str>>(factors: &[(S, (f64, f64))]) -> Result<ExperimentTable> {
    let mut levels: Vec<(&str, [f64; 2])> = Vec::with_capacity(factors.len());
    for (name, (low, high)) in factors {
        let name = name.as_ref();
        if !low.is_finite() || !high.is_finite() || low == high {
            return Err(Error::invalid_params(format!(
                "factor '{name}' needs two distinct finite levels, got {low} and {high}"
            )));
        }
        levels.push((name, [*low, *high]));
    }
    expand_grid(&levels, GridOrder::LeftmostSlowest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn coded(k: usize) -> Vec<(String, (f64, f64))> {
        (0..k)
            .map(|i| (format!("X{}", i + 1), (-1.0, 1.0)))
            .collect()
    }

    fn rows(table: &ExperimentTable) -> Vec<Vec<i64>> {
        (0..table.runs())
            .map(|run| {
                table
                    .iter()
                    .map(|c| c.levels()[run] as i64)
                    .collect::<Vec<i64>>()
            })
            .collect()
    }

    #[test]
    fn test_full_factorial_is_bijection() {
        for k in 1..=6 {
            let table = full_factorial_grid(&coded(k)).unwrap();
            assert_eq!(table.runs(), 1 << k);
            assert_eq!(table.len(), k);

            let distinct: HashSet<Vec<i64>> = rows(&table).into_iter().collect();
            assert_eq!(distinct.len(), 1 << k, "duplicate rows for k = {k}");
            for row in &distinct {
                assert!(row.iter().all(|&v| v == -1 || v == 1));
            }
        }
    }

    #[test]
    fn test_leftmost_slowest_order() {
        let table = full_factorial_grid(&coded(3)).unwrap();
        assert_eq!(
            rows(&table),
            vec![
                vec![-1, -1, -1],
                vec![-1, -1, 1],
                vec![-1, 1, -1],
                vec![-1, 1, 1],
                vec![1, -1, -1],
                vec![1, -1, 1],
                vec![1, 1, -1],
                vec![1, 1, 1],
            ]
        );
    }

    #[test]
    fn test_standard_order() {
        let table = expand_grid(
            &[("A", [-1.0, 1.0]), ("B", [-1.0, 1.0]), ("C", [-1.0, 1.0])],
            GridOrder::Standard,
        )
        .unwrap();
        assert_eq!(
            table.column("A").unwrap().to_vec(),
            vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]
        );
        assert_eq!(
            table.column("B").unwrap().to_vec(),
            vec![-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0]
        );
        assert_eq!(
            table.column("C").unwrap().to_vec(),
            vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_order_follows_caller_sequence() {
        let ab = full_factorial_grid(&[("A", (-1.0, 1.0)), ("B", (-1.0, 1.0))]).unwrap();
        let ba = full_factorial_grid(&[("B", (-1.0, 1.0)), ("A", (-1.0, 1.0))]).unwrap();
        assert_eq!(ab.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(ba.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(ab.column("A"), ba.column("B"));
    }

    #[test]
    fn test_mixed_levels() {
        let table = expand_grid(
            &[("P", vec![-1.0, 0.0, 1.0]), ("Q", vec![-1.0, 1.0])],
            GridOrder::LeftmostSlowest,
        )
        .unwrap();
        assert_eq!(table.runs(), 6);
        assert_eq!(
            table.column("P").unwrap().to_vec(),
            vec![-1.0, -1.0, 0.0, 0.0, 1.0, 1.0]
        );
        assert_eq!(
            table.column("Q").unwrap().to_vec(),
            vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]
        );
    }

    #[test]
    fn test_expand_grid_errors() {
        let empty: [(&str, [f64; 2]); 0] = [];
        assert!(matches!(
            expand_grid(&empty, GridOrder::Standard),
            Err(Error::InvalidParams { .. })
        ));

        let no_levels: [(&str, Vec<f64>); 1] = [("A", vec![])];
        assert!(matches!(
            expand_grid(&no_levels, GridOrder::Standard),
            Err(Error::InvalidParams { .. })
        ));

        let duplicate = full_factorial_grid(&[("A", (-1.0, 1.0)), ("A", (-1.0, 1.0))]);
        assert_eq!(duplicate.unwrap_err(), Error::DuplicateFactor("A".to_string()));
    }

    #[test]
    fn test_full_factorial_rejects_degenerate_levels() {
        let same = full_factorial_grid(&[("A", (-1.0, 1.0)), ("B", (0.5, 0.5))]);
        assert!(matches!(same, Err(Error::InvalidParams { .. })));

        let nan = full_factorial_grid(&[("A", (f64::NAN, 1.0))]);
        assert!(matches!(nan, Err(Error::InvalidParams { .. })));

        // Reversed levels are still two distinct levels.
        let reversed = full_factorial_grid(&[("A", (1.0, -1.0))]).unwrap();
        assert_eq!(reversed.column("A").unwrap().to_vec(), vec![1.0, -1.0]);
    }
}
