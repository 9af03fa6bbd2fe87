//! Experiment tables and design expansion.
//!
//! This module provides the data structure that holds one experiment:
//!
//! - [`ExperimentTable`]: named, equal-length columns (factors and responses)
//! - [`expand_grid`] / [`full_factorial_grid`]: generate every combination of
//!   factor levels
//! - [`main_effects`]: per-level response means for each factor
//!
//! ## Example
//!
//! ```
//! use factorial::{ExperimentTable, Factor};
//!
//! let table = ExperimentTable::gather([
//!     Factor::coded("A", &[-1.0, 1.0, -1.0, 1.0]),
//!     Factor::coded("B", &[-1.0, -1.0, 1.0, 1.0]),
//!     Factor::coded("y", &[52.0, 74.0, 62.0, 80.0]),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.runs(), 4);
//! assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B", "y"]);
//! ```

mod expand;
mod main_effects;

pub use expand::{expand_grid, full_factorial_grid, GridOrder};
pub use main_effects::{main_effects, MainEffect};

use ndarray::Array1;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::factor::Factor;

/// A table of named, equal-length columns describing one experiment.
///
/// Column order is insertion order. It matters for display only.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExperimentTable {
    columns: Vec<Factor>,
}

impl ExperimentTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a table from factor columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the columns differ in length and
    /// [`Error::DuplicateFactor`] if a name is repeated.
    pub fn gather(factors: impl IntoIterator<Item = Factor>) -> Result<Self> {
        let mut table = Self::new();
        for factor in factors {
            table.insert(factor)?;
        }
        Ok(table)
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the column length differs from the
    /// table's run count and [`Error::DuplicateFactor`] if the name is taken.
    pub fn insert(&mut self, factor: Factor) -> Result<()> {
        if self.contains(factor.name()) {
            return Err(Error::DuplicateFactor(factor.name().to_string()));
        }
        if let Some(first) = self.columns.first() {
            if first.runs() != factor.runs() {
                return Err(Error::ShapeMismatch {
                    name: factor.name().to_string(),
                    expected: first.runs(),
                    actual: factor.runs(),
                });
            }
        }
        self.columns.push(factor);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn with_column(mut self, name: impl Into<String>, values: &[f64]) -> Result<Self> {
        self.insert(Factor::coded(name, values))?;
        Ok(self)
    }

    /// Number of runs (rows). Zero for a table without columns.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.columns.first().map_or(0, Factor::runs)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether a column with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Factor::name)
    }

    /// Columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Factor> + '_ {
        self.columns.iter()
    }

    /// Look up a column as a [`Factor`].
    #[must_use]
    pub fn factor(&self, name: &str) -> Option<&Factor> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column's values.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.factor(name).map(Factor::levels)
    }

    /// Look up a column's values, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFactor`] if there is no column with this name.
    pub fn require(&self, name: &str) -> Result<&Array1<f64>> {
        self.column(name)
            .ok_or_else(|| Error::unknown_factor(name, self.names()))
    }
}

impl fmt::Display for ExperimentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                c.levels()
                    .iter()
                    .map(|v| v.to_string().len())
                    .chain(std::iter::once(c.name().len()))
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        for (i, (column, width)) in self.columns.iter().zip(&widths).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:>width$}", column.name(), width = *width)?;
        }
        writeln!(f)?;

        for run in 0..self.runs() {
            for (i, (column, width)) in self.columns.iter().zip(&widths).enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", column.levels()[run].to_string(), width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
