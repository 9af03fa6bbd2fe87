//! Fitted model types.

use ndarray::Array1;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::spec::{ModelSpec, Term};
use super::stats::t_critical_value;
use crate::design::ExperimentTable;

/// Configuration for least-squares fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitConfig {
    /// A column is treated as aliased when the magnitude of its R diagonal
    /// falls below this fraction of the largest column norm (default: 1e-10).
    pub rank_tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            rank_tolerance: 1e-10,
        }
    }
}

/// Estimate and inference for one model term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coefficient {
    /// The term this coefficient multiplies.
    pub term: Term,
    /// Least-squares estimate.
    pub estimate: f64,
    /// Standard error, None when the model has no residual degrees of freedom.
    pub std_error: Option<f64>,
    /// t statistic (estimate / standard error).
    pub t_value: Option<f64>,
    /// Two-sided p-value of the t statistic.
    pub p_value: Option<f64>,
}

impl Coefficient {
    /// Label of the term, e.g. `"A:B"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.term.label()
    }
}

/// Confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Confidence level (e.g., 0.95 for 95%).
    pub level: f64,
}

/// Overall F test of the model against the intercept-only model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FTest {
    /// F statistic.
    pub statistic: f64,
    /// Numerator degrees of freedom (non-intercept terms).
    pub df_model: usize,
    /// Denominator degrees of freedom (residual).
    pub df_resid: usize,
    /// P(F > statistic).
    pub p_value: f64,
}

/// A linear model fitted by least squares.
///
/// Owns its estimates, its [`ModelSpec`] and a copy of the experiment it was fitted
/// on. Immutable once created.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FittedModel {
    pub(crate) spec: ModelSpec,
    pub(crate) table: ExperimentTable,
    pub(crate) response: String,
    pub(crate) coefficients: Vec<Coefficient>,
    pub(crate) fitted_values: Array1<f64>,
    pub(crate) residuals: Array1<f64>,
    pub(crate) df_resid: usize,
    pub(crate) scale: Option<f64>,
    pub(crate) r_squared: Option<f64>,
    pub(crate) adj_r_squared: Option<f64>,
    pub(crate) f_test: Option<FTest>,
}

impl FittedModel {
    /// The model spec.
    #[must_use]
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// The experiment the model was fitted on.
    #[must_use]
    pub fn table(&self) -> &ExperimentTable {
        &self.table
    }

    /// Name of the response column.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Coefficients in design-matrix order (intercept first, if present).
    #[must_use]
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Look a coefficient up by label (`"Intercept"`, `"A"`, `"A:B"`, ...).
    ///
    /// Interaction labels match regardless of factor order.
    #[must_use]
    pub fn coefficient(&self, label: &str) -> Option<&Coefficient> {
        let wanted = if label == super::spec::INTERCEPT_LABEL {
            Term::intercept()
        } else {
            Term::new(label.split(crate::factor::INTERACTION_SEPARATOR))
        };
        self.coefficients.iter().find(|c| c.term == wanted)
    }

    /// Intercept estimate, if the model has one.
    #[must_use]
    pub fn intercept(&self) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.term.is_intercept())
            .map(|c| c.estimate)
    }

    /// Coefficient estimates as an array, in design-matrix order.
    #[must_use]
    pub fn params(&self) -> Array1<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    /// Number of runs used in the fit.
    #[must_use]
    pub fn nobs(&self) -> usize {
        self.fitted_values.len()
    }

    /// Residual degrees of freedom (runs minus estimated coefficients).
    #[must_use]
    pub fn df_resid(&self) -> usize {
        self.df_resid
    }

    /// Whether the model has as many coefficients as runs.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.df_resid == 0
    }

    /// Residual variance estimate s², undefined (None) for a saturated model.
    #[must_use]
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Residual standard error s, undefined (None) for a saturated model.
    #[must_use]
    pub fn residual_standard_error(&self) -> Option<f64> {
        self.scale.map(f64::sqrt)
    }

    /// Fitted values X·β, one per run.
    #[must_use]
    pub fn fitted_values(&self) -> &Array1<f64> {
        &self.fitted_values
    }

    /// Residuals y - X·β, one per run.
    #[must_use]
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    /// Coefficient of determination.
    #[must_use]
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    /// R² adjusted for the number of terms.
    #[must_use]
    pub fn adj_r_squared(&self) -> Option<f64> {
        self.adj_r_squared
    }

    /// Overall F test, when the model has an intercept, at least one other
    /// term and residual degrees of freedom.
    #[must_use]
    pub fn f_test(&self) -> Option<FTest> {
        self.f_test
    }

    /// Two-sided confidence intervals for every coefficient.
    ///
    /// `level` may be any confidence level strictly between 0 and 1.
    /// Returns None for a saturated model or a level outside that range.
    #[must_use]
    pub fn confidence_intervals(&self, level: f64) -> Option<Vec<ConfidenceInterval>> {
        if self.is_saturated() || !(level > 0.0 && level < 1.0) {
            return None;
        }
        let t = t_critical_value(level, self.df_resid);
        self.coefficients
            .iter()
            .map(|c| {
                c.std_error.map(|se| ConfidenceInterval {
                    lower: c.estimate - t * se,
                    upper: c.estimate + t * se,
                    level,
                })
            })
            .collect()
    }

    /// The residual standard error line of a summary report.
    #[must_use]
    pub fn residual_line(&self) -> ResidualLine {
        ResidualLine {
            standard_error: self.residual_standard_error(),
            df_resid: self.df_resid,
        }
    }
}

/// Displays as `Residual standard error: <s> on <df> degrees of freedom.`,
/// with `---` in place of `s` when it is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualLine {
    /// Residual standard error, if defined.
    pub standard_error: Option<f64>,
    /// Residual degrees of freedom.
    pub df_resid: usize,
}

impl fmt::Display for ResidualLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_error {
            Some(s) => write!(
                f,
                "Residual standard error: {s} on {} degrees of freedom.",
                self.df_resid
            ),
            None => write!(
                f,
                "Residual standard error: --- on {} degrees of freedom.",
                self.df_resid
            ),
        }
    }
}
