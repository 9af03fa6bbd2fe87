//! Error types for the factorial library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! specific variants for table assembly, formula parsing, model fitting and
//! surface prediction.

use thiserror::Error;

/// The main error type for the factorial library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ Table Errors ============
    /// Two columns that must line up run-for-run have different lengths.
    #[error("shape mismatch for '{name}': expected {expected} runs, got {actual}")]
    ShapeMismatch {
        /// Name of the offending factor or column.
        name: String,
        /// Expected number of runs.
        expected: usize,
        /// Actual number of runs.
        actual: usize,
    },

    /// A factor name is used twice in one experiment table.
    #[error("factor '{0}' appears more than once")]
    DuplicateFactor(String),

    // ============ Formula Errors ============
    /// The model formula is empty or cannot be parsed.
    #[error("malformed model formula at position {position}: {message}")]
    MalformedSpec {
        /// Byte offset into the formula where the problem was found.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// A name does not refer to any known factor.
    #[error("unknown factor '{name}' (available: {available})")]
    UnknownFactor {
        /// The name that could not be resolved.
        name: String,
        /// Comma-separated list of the names that are available.
        available: String,
    },

    // ============ Fitting Errors ============
    /// The design matrix does not have full column rank.
    #[error(
        "singular design: {terms} terms on {runs} runs, cannot resolve [{}]",
        .unresolved.join(", ")
    )]
    SingularDesign {
        /// Number of runs (rows of the design matrix).
        runs: usize,
        /// Number of terms (columns of the design matrix).
        terms: usize,
        /// Labels of the terms that are aliased with earlier terms.
        unresolved: Vec<String>,
    },

    // ============ Prediction Errors ============
    /// A prediction needs a factor value that was not supplied.
    #[error("no value supplied for factor '{0}'")]
    MissingFactor(String),

    // ============ Parameter Validation Errors ============
    /// Invalid parameters.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },
}

/// A specialized `Result` type for factorial operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a new `MalformedSpec` error.
    #[must_use]
    pub fn malformed_spec(position: usize, message: impl Into<String>) -> Self {
        Self::MalformedSpec {
            position,
            message: message.into(),
        }
    }

    /// Create a new `UnknownFactor` error listing the names that were available.
    #[must_use]
    pub fn unknown_factor<I, S>(name: impl Into<String>, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available: Vec<String> = available
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        Self::UnknownFactor {
            name: name.into(),
            available: available.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ShapeMismatch {
            name: "B".to_string(),
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("'B'"));
        assert!(err.to_string().contains("expected 4"));

        let err = Error::unknown_factor("Z", ["A", "B"]);
        assert_eq!(err.to_string(), "unknown factor 'Z' (available: A, B)");

        let err = Error::SingularDesign {
            runs: 4,
            terms: 8,
            unresolved: vec!["A:B".to_string(), "A:B:C".to_string()],
        };
        assert!(err.to_string().contains("8 terms on 4 runs"));
        assert!(err.to_string().contains("[A:B, A:B:C]"));

        let err = Error::malformed_spec(3, "dangling '+'");
        assert!(err.to_string().contains("position 3"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::MissingFactor("C".to_string());
        let err2 = Error::MissingFactor("C".to_string());
        let err3 = Error::MissingFactor("D".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
