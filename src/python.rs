//! Python bindings for factorial.
//!
//! This module exposes model fitting, Pareto ranking and surface prediction
//! to Python using PyO3. Enable the `python` feature to use this.

use std::collections::HashMap;

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::design::{full_factorial_grid, ExperimentTable};
use crate::error::Error;
use crate::factor::Factor;
use crate::model::{lm as fit_formula, FittedModel};
use crate::pareto::pareto_rank;
use crate::surface::{predict_surface_with_policy, MissingFactorPolicy};

fn to_py_err(error: Error) -> PyErr {
    match error {
        Error::UnknownFactor { .. } | Error::MissingFactor(_) => PyKeyError::new_err(error.to_string()),
        _ => PyValueError::new_err(error.to_string()),
    }
}

/// Python wrapper for FittedModel
#[pyclass(name = "FittedModel")]
pub struct PyFittedModel {
    inner: FittedModel,
}

#[pymethods]
impl PyFittedModel {
    /// Coefficients as (label, estimate) pairs, intercept first.
    #[getter]
    fn coefficients(&self) -> Vec<(String, f64)> {
        self.inner
            .coefficients()
            .iter()
            .map(|c| (c.label(), c.estimate))
            .collect()
    }

    /// Standard errors, None for a saturated model.
    #[getter]
    fn std_errors(&self) -> Vec<Option<f64>> {
        self.inner.coefficients().iter().map(|c| c.std_error).collect()
    }

    /// Residual degrees of freedom.
    #[getter]
    fn df_resid(&self) -> usize {
        self.inner.df_resid()
    }

    /// Residual variance, None for a saturated model.
    #[getter]
    fn scale(&self) -> Option<f64> {
        self.inner.scale()
    }

    /// Coefficient of determination.
    #[getter]
    fn r_squared(&self) -> Option<f64> {
        self.inner.r_squared()
    }

    /// The formula the model was fitted with.
    #[getter]
    fn formula(&self) -> String {
        self.inner.spec().to_string()
    }

    /// The residual standard error line of a summary.
    fn residual_line(&self) -> String {
        self.inner.residual_line().to_string()
    }

    /// Effects as (label, value, sign) triples, smallest magnitude first.
    fn pareto(&self) -> Vec<(String, f64, String)> {
        pareto_rank(&self.inner)
            .into_iter()
            .map(|e| (e.label, e.value, e.sign.to_string()))
            .collect()
    }

    /// Predict over a grid; rows follow `y_grid`, columns follow `x_grid`.
    #[pyo3(signature = (x_factor, y_factor, x_grid, y_grid, other_factors=None, strict=false))]
    fn predict_surface(
        &self,
        x_factor: &str,
        y_factor: &str,
        x_grid: Vec<f64>,
        y_grid: Vec<f64>,
        other_factors: Option<HashMap<String, f64>>,
        strict: bool,
    ) -> PyResult<Vec<Vec<f64>>> {
        let other: Vec<(String, f64)> = other_factors.unwrap_or_default().into_iter().collect();
        let policy = if strict {
            MissingFactorPolicy::Strict
        } else {
            MissingFactorPolicy::ZeroDefault
        };
        let z = predict_surface_with_policy(
            &self.inner,
            x_factor,
            y_factor,
            &x_grid,
            &y_grid,
            &other,
            policy,
        )
        .map_err(to_py_err)?;
        Ok(z.rows().into_iter().map(|row| row.to_vec()).collect())
    }

    fn __repr__(&self) -> String {
        format!("FittedModel('{}')", self.inner.spec())
    }
}

/// Fit a linear model given as a formula, e.g. `lm("y ~ A*B", data)`.
///
/// `data` maps column names to equal-length lists of numbers.
#[pyfunction]
fn lm(formula: &str, data: &PyDict) -> PyResult<PyFittedModel> {
    let mut table = ExperimentTable::new();
    for (key, value) in data.iter() {
        let name: String = key.extract()?;
        let values: Vec<f64> = value.extract()?;
        table
            .insert(Factor::coded(name, &values))
            .map_err(to_py_err)?;
    }
    let inner = fit_formula(formula, &table).map_err(to_py_err)?;
    Ok(PyFittedModel { inner })
}

/// Two-level full factorial design as (name, levels) pairs.
#[pyfunction]
#[pyo3(signature = (names, low=-1.0, high=1.0))]
fn full_factorial(names: Vec<String>, low: f64, high: f64) -> PyResult<Vec<(String, Vec<f64>)>> {
    let factors: Vec<(String, (f64, f64))> = names.into_iter().map(|n| (n, (low, high))).collect();
    let table = full_factorial_grid(&factors).map_err(to_py_err)?;
    Ok(table
        .iter()
        .map(|f| (f.name().to_string(), f.levels().to_vec()))
        .collect())
}

/// The factorial Python module.
#[pymodule]
fn factorial(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyFittedModel>()?;
    m.add_function(wrap_pyfunction!(lm, m)?)?;
    m.add_function(wrap_pyfunction!(full_factorial, m)?)?;
    Ok(())
}
