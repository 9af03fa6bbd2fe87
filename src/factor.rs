//! Coded experimental factors.
//!
//! A [`Factor`] is a named column of numeric levels, one entry per run of the
//! experiment. Levels are usually coded as `-1` / `+1`, but any numeric
//! coding is accepted.
//!
//! Interaction columns are derived by multiplying factors elementwise:
//!
//! ```
//! use factorial::Factor;
//!
//! let a = Factor::coded("A", &[-1.0, 1.0, -1.0, 1.0]);
//! let b = Factor::coded("B", &[-1.0, -1.0, 1.0, 1.0]);
//!
//! let ab = a.combine(&b).unwrap();
//! assert_eq!(ab.name(), "A:B");
//! assert_eq!(ab.levels().to_vec(), vec![1.0, -1.0, -1.0, 1.0]);
//! ```

use ndarray::Array1;
use std::fmt;
use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator used when deriving the name of an interaction column.
pub const INTERACTION_SEPARATOR: char = ':';

/// A named experimental factor with one level per run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Factor {
    name: String,
    levels: Array1<f64>,
}

impl Factor {
    /// Create a factor from a name and its per-run levels.
    #[must_use]
    pub fn new(name: impl Into<String>, levels: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            levels,
        }
    }

    /// Create a factor from a slice of levels.
    #[must_use]
    pub fn coded(name: impl Into<String>, levels: &[f64]) -> Self {
        Self::new(name, Array1::from(levels.to_vec()))
    }

    /// Return the same levels under a different name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The factor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-run levels.
    #[must_use]
    pub fn levels(&self) -> &Array1<f64> {
        &self.levels
    }

    /// Number of runs.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.levels.len()
    }

    /// Elementwise product of two factors.
    ///
    /// The result is named `"<self>:<other>"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the two factors have a different
    /// number of runs.
    pub fn combine(&self, other: &Factor) -> Result<Factor> {
        if self.runs() != other.runs() {
            return Err(Error::ShapeMismatch {
                name: other.name.clone(),
                expected: self.runs(),
                actual: other.runs(),
            });
        }

        Ok(Factor {
            name: format!("{}{}{}", self.name, INTERACTION_SEPARATOR, other.name),
            levels: &self.levels * &other.levels,
        })
    }

    /// Sorted distinct levels present in this factor.
    #[must_use]
    pub fn distinct_levels(&self) -> Vec<f64> {
        let mut distinct: Vec<f64> = Vec::new();
        for &value in &self.levels {
            if !distinct.iter().any(|&d| d == value) {
                distinct.push(value);
            }
        }
        distinct.sort_by(f64::total_cmp);
        distinct
    }
}

impl Mul<&Factor> for &Factor {
    type Output = Result<Factor>;

    fn mul(self, rhs: &Factor) -> Self::Output {
        self.combine(rhs)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = [", self.name)?;
        for (i, value) in self.levels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> (Factor, Factor, Factor) {
        (
            Factor::coded("A", &[-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]),
            Factor::coded("B", &[-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0]),
            Factor::coded("C", &[-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]),
        )
    }

    #[test]
    fn test_combine_names_and_values() {
        let (a, b, _) = abc();
        let ab = a.combine(&b).unwrap();
        assert_eq!(ab.name(), "A:B");
        assert_eq!(
            ab.levels().to_vec(),
            vec![1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0]
        );
    }

    #[test]
    fn test_combine_shape_mismatch() {
        let a = Factor::coded("A", &[-1.0, 1.0]);
        let b = Factor::coded("B", &[-1.0, 1.0, 1.0]);
        let err = a.combine(&b).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                name: "B".to_string(),
                expected: 2,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_combine_is_associative() {
        let (a, b, c) = abc();
        let left = a.combine(&b).unwrap().combine(&c).unwrap();
        let right = a.combine(&b.combine(&c).unwrap()).unwrap();
        let direct = a.levels() * b.levels() * c.levels();

        assert_eq!(left.levels(), &direct);
        assert_eq!(right.levels(), &direct);
        assert_eq!(left.name(), "A:B:C");
        assert_eq!(right.name(), "A:B:C");
    }

    #[test]
    fn test_mul_operator() {
        let (a, b, _) = abc();
        let ab = (&a * &b).unwrap();
        assert_eq!(ab, a.combine(&b).unwrap());
    }

    #[test]
    fn test_non_standard_coding() {
        let temp = Factor::coded("T", &[150.0, 200.0]);
        let time = Factor::coded("t", &[0.5, 2.0]);
        let product = temp.combine(&time).unwrap();
        assert_eq!(product.levels().to_vec(), vec![75.0, 400.0]);
    }

    #[test]
    fn test_distinct_levels_sorted() {
        let f = Factor::coded("A", &[1.0, -1.0, 0.0, 1.0, -1.0]);
        assert_eq!(f.distinct_levels(), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_with_name_and_display() {
        let f = Factor::coded("A", &[-1.0, 1.0]).with_name("Temp");
        assert_eq!(f.name(), "Temp");
        assert_eq!(f.to_string(), "Temp = [-1, 1]");
    }
}
