//! Ordinary least-squares fitting.
//!
//! The design matrix is factored as X = QR with a Householder QR from
//! `faer`; the normal equations are never formed. Rank is read off the
//! diagonal of R, so aliased terms are reported instead of producing NaNs.

use faer::Mat;
use log::{debug, warn};
use ndarray::{Array1, Array2};

use super::matrix::design_matrix;
use super::spec::ModelSpec;
use super::stats::{f_distribution_p_value, t_distribution_p_value};
use super::types::{Coefficient, FTest, FitConfig, FittedModel};
use crate::design::ExperimentTable;
use crate::error::{Error, Result};

/// Fit `spec` to the `response` column of `table` by least squares.
///
/// # Errors
///
/// - [`Error::UnknownFactor`] if the response or a term's factor is missing
/// - [`Error::InvalidParams`] if the table has no runs
/// - [`Error::SingularDesign`] if the design matrix is rank deficient
///
/// # Example
///
/// ```
/// use factorial::{fit, ExperimentTable, ModelSpec};
///
/// let table = ExperimentTable::new()
///     .with_column("A", &[-1.0, 1.0, -1.0, 1.0]).unwrap()
///     .with_column("B", &[-1.0, -1.0, 1.0, 1.0]).unwrap()
///     .with_column("y", &[52.0, 74.0, 62.0, 80.0]).unwrap();
/// let spec = ModelSpec::parse("y ~ A + B + A:B", table.names()).unwrap();
///
/// let model = fit(&table, &spec, "y").unwrap();
/// assert!((model.coefficient("A").unwrap().estimate - 10.0).abs() < 1e-12);
/// assert_eq!(model.df_resid(), 0);
/// assert_eq!(model.scale(), None);
/// ```
pub fn fit(table: &ExperimentTable, spec: &ModelSpec, response: &str) -> Result<FittedModel> {
    fit_with_config(table, spec, response, &FitConfig::default())
}

/// Parse `formula` against the table's columns and fit it.
///
/// The response is taken from the left-hand side of `~`.
///
/// # Errors
///
/// Returns [`Error::MalformedSpec`] if the formula has no response, plus any
/// error from [`ModelSpec::parse`] or [`fit`].
pub fn lm(formula: &str, table: &ExperimentTable) -> Result<FittedModel> {
    let spec = ModelSpec::parse(formula, table.names())?;
    let response = spec
        .response()
        .ok_or_else(|| Error::malformed_spec(0, "formula needs a response, e.g. 'y ~ A*B'"))?
        .to_string();
    fit(table, &spec, &response)
}

/// [`fit`] with explicit configuration.
///
/// # Errors
///
/// Same as [`fit`].
pub fn fit_with_config(
    table: &ExperimentTable,
    spec: &ModelSpec,
    response: &str,
    config: &FitConfig,
) -> Result<FittedModel> {
    let y = table.require(response)?.clone();
    let x = design_matrix(table, spec)?;
    let (runs, terms) = x.dim();

    if runs == 0 {
        return Err(Error::invalid_params("experiment has no runs"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_params(format!(
            "response '{response}' contains non-finite values"
        )));
    }
    if let Some(term) = (0..terms).find(|&j| x.column(j).iter().any(|v| !v.is_finite())) {
        return Err(Error::invalid_params(format!(
            "term '{}' contains non-finite values",
            spec.labels()[term]
        )));
    }

    debug!("fitting '{spec}' to '{response}': {runs} runs x {terms} columns");

    let labels = spec.labels();
    let x_faer = Mat::<f64>::from_fn(runs, terms, |i, j| x[[i, j]]);
    let qr = x_faer.as_ref().qr();
    let r_faer = qr.R();

    // Column j is resolvable only if it has a non-negligible component
    // orthogonal to columns 0..j.
    let column_scale = x
        .columns()
        .into_iter()
        .map(|c| c.dot(&c).sqrt())
        .fold(0.0_f64, f64::max);
    let tolerance = config.rank_tolerance * column_scale.max(f64::MIN_POSITIVE);
    let unresolved: Vec<String> = (0..terms)
        .filter(|&j| j >= runs || r_faer[(j, j)].abs() <= tolerance)
        .map(|j| labels[j].clone())
        .collect();

    if !unresolved.is_empty() {
        debug!("design is rank deficient, aliased columns: {unresolved:?}");
        return Err(Error::SingularDesign {
            runs,
            terms,
            unresolved,
        });
    }

    let r = Array2::from_shape_fn((terms, terms), |(i, j)| {
        if i <= j {
            r_faer[(i, j)]
        } else {
            0.0
        }
    });
    let q_faer = qr.compute_thin_Q();
    let qty = Array1::from_shape_fn(terms, |j| (0..runs).map(|i| q_faer[(i, j)] * y[i]).sum());

    let beta = back_substitute(&r, &qty);
    let fitted_values = x.dot(&beta);
    let residuals = &y - &fitted_values;
    let rss = residuals.dot(&residuals);
    let df_resid = runs - terms;

    let scale = if df_resid > 0 {
        Some(rss / df_resid as f64)
    } else {
        warn!("model '{spec}' is saturated: {terms} terms on {runs} runs, error variance is undefined");
        None
    };

    // diag((X'X)^-1) = squared row norms of R^-1.
    let r_inv = upper_triangular_inverse(&r);
    let unscaled_variance: Vec<f64> = r_inv.rows().into_iter().map(|row| row.dot(&row)).collect();

    let coefficients: Vec<Coefficient> = spec
        .columns()
        .into_iter()
        .zip(beta.iter())
        .zip(unscaled_variance)
        .map(|((term, &estimate), v)| {
            let std_error = scale.map(|s2| (s2 * v).sqrt());
            let t_value = std_error.map(|se| estimate / se);
            let p_value = t_value.map(|t| t_distribution_p_value(t, df_resid));
            Coefficient {
                term,
                estimate,
                std_error,
                t_value,
                p_value,
            }
        })
        .collect();

    let (r_squared, adj_r_squared, f_test) =
        goodness_of_fit(&y, rss, spec.has_intercept(), terms, df_resid);

    debug!(
        "fit complete: df_resid = {df_resid}, rss = {rss:.6}, r_squared = {:?}",
        r_squared
    );

    Ok(FittedModel {
        spec: spec.clone().with_response(response),
        table: table.clone(),
        response: response.to_string(),
        coefficients,
        fitted_values,
        residuals,
        df_resid,
        scale,
        r_squared,
        adj_r_squared,
        f_test,
    })
}

/// R², adjusted R² and the overall F test.
///
/// With an intercept the total sum of squares is centered, otherwise it is
/// taken about zero.
fn goodness_of_fit(
    y: &Array1<f64>,
    rss: f64,
    intercept: bool,
    terms: usize,
    df_resid: usize,
) -> (Option<f64>, Option<f64>, Option<FTest>) {
    let runs = y.len();
    let center = if intercept {
        y.sum() / runs as f64
    } else {
        0.0
    };
    let tss: f64 = y.iter().map(|v| (v - center).powi(2)).sum();
    if tss <= 0.0 {
        return (None, None, None);
    }

    let r_squared = 1.0 - rss / tss;
    if df_resid == 0 {
        return (Some(r_squared), None, None);
    }

    let df_model = terms - usize::from(intercept);
    let adj_r_squared =
        1.0 - (runs - usize::from(intercept)) as f64 / df_resid as f64 * (1.0 - r_squared);

    let f_test = (intercept && df_model > 0).then(|| {
        let statistic = ((tss - rss) / df_model as f64) / (rss / df_resid as f64);
        FTest {
            statistic,
            df_model,
            df_resid,
            p_value: f_distribution_p_value(statistic, df_model, df_resid),
        }
    });

    (Some(r_squared), Some(adj_r_squared), f_test)
}

/// Solve R·β = b for upper-triangular, non-singular R.
fn back_substitute(r: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut beta = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|k| r[[i, k]] * beta[k]).sum();
        beta[i] = (b[i] - tail) / r[[i, i]];
    }
    beta
}

/// Inverse of an upper-triangular, non-singular matrix.
fn upper_triangular_inverse(r: &Array2<f64>) -> Array2<f64> {
    let n = r.nrows();
    let mut inverse = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut unit = Array1::<f64>::zeros(n);
        unit[j] = 1.0;
        inverse.column_mut(j).assign(&back_substitute(r, &unit));
    }
    inverse
}
