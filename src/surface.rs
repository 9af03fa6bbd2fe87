//! Prediction from a fitted model.
//!
//! A prediction evaluates every model column at a single point: the same
//! products of factor values as the design matrix, applied to scalars, then
//! dotted with the coefficients. [`predict_surface`] does this over a
//! rectangular grid of two free factors while holding the others fixed.
//!
//! # Missing factors
//!
//! A factor the model uses but the caller does not supply is held at 0, the
//! centre of the usual -1/+1 coding. Use [`MissingFactorPolicy::Strict`] to
//! get [`Error::MissingFactor`] instead, for designs where 0 is not a
//! sensible centre.
//!
//! # Example
//!
//! ```
//! use factorial::{lm, linspace, predict_surface, ExperimentTable};
//!
//! let table = ExperimentTable::new()
//!     .with_column("A", &[-1.0, 1.0, -1.0, 1.0]).unwrap()
//!     .with_column("B", &[-1.0, -1.0, 1.0, 1.0]).unwrap()
//!     .with_column("y", &[52.0, 74.0, 62.0, 80.0]).unwrap();
//! let model = lm("y ~ A*B", &table).unwrap();
//!
//! let grid = linspace(-1.0, 1.0, 3);
//! let none: &[(&str, f64)] = &[];
//! let z = predict_surface(&model, "A", "B", grid.as_slice().unwrap(), &[-1.0, 1.0], none).unwrap();
//! assert_eq!(z.dim(), (2, 3));
//! assert!((z[[0, 0]] - 52.0).abs() < 1e-9);
//! assert!((z[[1, 2]] - 80.0).abs() < 1e-9);
//! ```

use log::trace;
use ndarray::{Array1, Array2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{design_row, FittedModel};

/// What to do when a prediction needs a factor value that was not supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MissingFactorPolicy {
    /// Hold the factor at 0.
    #[default]
    ZeroDefault,
    /// Fail with [`Error::MissingFactor`].
    Strict,
}

impl MissingFactorPolicy {
    fn resolve(self, name: &str) -> Result<f64> {
        match self {
            Self::ZeroDefault => Ok(0.0),
            Self::Strict => Err(Error::MissingFactor(name.to_string())),
        }
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
#[must_use]
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, stop, n)
}

/// Predict the response at a single point.
///
/// `point` gives factor values by name; names the model does not use are an
/// error, factors it uses but `point` omits follow `policy`.
///
/// # Errors
///
/// - [`Error::UnknownFactor`] if `point` names a factor the model does not use
/// - [`Error::MissingFactor`] under [`MissingFactorPolicy::Strict`]
pub fn predict<S: AsRef<str>>(
    model: &FittedModel,
    point: &[(S, f64)],
    policy: MissingFactorPolicy,
) -> Result<f64> {
    let factors = model.spec().factors();
    for (name, _) in point {
        check_model_factor(&factors, name.as_ref())?;
    }

    let row = design_row(model.spec(), |name| {
        match point.iter().find(|(n, _)| n.as_ref() == name) {
            Some((_, value)) => Ok(*value),
            None => policy.resolve(name),
        }
    })?;
    Ok(row.dot(&model.params()))
}

/// Predict the response over a grid of two factors.
///
/// Element `[i, j]` of the result is the prediction at
/// (`x_grid[j]`, `y_grid[i]`), so the shape is (`y_grid.len()`,
/// `x_grid.len()`). Other factors come from `other_factors`, or are held at 0.
///
/// # Errors
///
/// - [`Error::UnknownFactor`] if a named factor is not used by the model
/// - [`Error::InvalidParams`] if `x_factor` and `y_factor` are the same
pub fn predict_surface<S: AsRef<str>>(
    model: &FittedModel,
    x_factor: &str,
    y_factor: &str,
    x_grid: &[f64],
    y_grid: &[f64],
    other_factors: &[(S, f64)],
) -> Result<Array2<f64>> {
    predict_surface_with_policy(
        model,
        x_factor,
        y_factor,
        x_grid,
        y_grid,
        other_factors,
        MissingFactorPolicy::default(),
    )
}

/// [`predict_surface`] with an explicit [`MissingFactorPolicy`].
///
/// # Errors
///
/// Same as [`predict_surface`], plus [`Error::MissingFactor`] under
/// [`MissingFactorPolicy::Strict`].
pub fn predict_surface_with_policy<S: AsRef<str>>(
    model: &FittedModel,
    x_factor: &str,
    y_factor: &str,
    x_grid: &[f64],
    y_grid: &[f64],
    other_factors: &[(S, f64)],
    policy: MissingFactorPolicy,
) -> Result<Array2<f64>> {
    let evaluator = SurfaceEvaluator::new(model, x_factor, y_factor, other_factors, policy)?;
    trace!(
        "predicting {} x {} surface over '{x_factor}' and '{y_factor}'",
        y_grid.len(),
        x_grid.len()
    );
    Ok(Array2::from_shape_fn((y_grid.len(), x_grid.len()), |(i, j)| {
        evaluator.at(x_grid[j], y_grid[i])
    }))
}

/// A model reduced to a function of two free factors.
///
/// Every column becomes `constant * x^a * y^b` with `a, b` in {0, 1}, the
/// constant being the product of the held factor values.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceEvaluator {
    columns: Vec<SurfaceColumn>,
}

#[derive(Debug, Clone, Copy)]
struct SurfaceColumn {
    weight: f64,
    uses_x: bool,
    uses_y: bool,
}

impl SurfaceEvaluator {
    pub(crate) fn new<S: AsRef<str>>(
        model: &FittedModel,
        x_factor: &str,
        y_factor: &str,
        other_factors: &[(S, f64)],
        policy: MissingFactorPolicy,
    ) -> Result<Self> {
        let factors = model.spec().factors();
        check_model_factor(&factors, x_factor)?;
        check_model_factor(&factors, y_factor)?;
        if x_factor == y_factor {
            return Err(Error::invalid_params(format!(
                "x and y factors must differ, both are '{x_factor}'"
            )));
        }
        for (name, _) in other_factors {
            check_model_factor(&factors, name.as_ref())?;
        }

        let held = |name: &str| -> Result<f64> {
            match other_factors.iter().find(|(n, _)| n.as_ref() == name) {
                Some((_, value)) => Ok(*value),
                None => policy.resolve(name),
            }
        };

        let columns = model
            .spec()
            .columns()
            .iter()
            .zip(model.coefficients())
            .map(|(term, coefficient)| -> Result<SurfaceColumn> {
                let mut column = SurfaceColumn {
                    weight: coefficient.estimate,
                    uses_x: false,
                    uses_y: false,
                };
                for name in term.factors() {
                    if name == x_factor {
                        column.uses_x = true;
                    } else if name == y_factor {
                        column.uses_y = true;
                    } else {
                        column.weight *= held(name)?;
                    }
                }
                Ok(column)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    pub(crate) fn at(&self, x: f64, y: f64) -> f64 {
        self.columns
            .iter()
            .map(|c| {
                let mut value = c.weight;
                if c.uses_x {
                    value *= x;
                }
                if c.uses_y {
                    value *= y;
                }
                value
            })
            .sum()
    }
}

fn check_model_factor(factors: &[&str], name: &str) -> Result<()> {
    if factors.contains(&name) {
        Ok(())
    } else {
        Err(Error::unknown_factor(name, factors))
    }
}

/// Settings for a contour chart of a fitted surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContourConfig {
    /// Grid points per axis, also the number of contour levels (default: 25).
    pub points: usize,
    /// Horizontal axis range (default: -3.2 to 3.2).
    pub x_limits: (f64, f64),
    /// Vertical axis range (default: -3.2 to 3.2).
    pub y_limits: (f64, f64),
    /// Colour map name (default: "terrain").
    pub colour_map: String,
    /// Overlay the experimental runs (default: true).
    pub show_experiment_data: bool,
    /// Figure size in inches (default: 10 x 10).
    pub figure_size: (f64, f64),
    /// Figure resolution (default: 100).
    pub dpi: u32,
    /// Policy for model factors other than the two axes.
    pub missing_factor_policy: MissingFactorPolicy,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            points: 25,
            x_limits: (-3.2, 3.2),
            y_limits: (-3.2, 3.2),
            colour_map: "terrain".to_string(),
            show_experiment_data: true,
            figure_size: (10.0, 10.0),
            dpi: 100,
            missing_factor_policy: MissingFactorPolicy::ZeroDefault,
        }
    }
}

/// A predicted surface ready to be drawn as a contour chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContourData {
    /// Factor on the horizontal axis.
    pub x_factor: String,
    /// Factor on the vertical axis.
    pub y_factor: String,
    /// Horizontal grid.
    pub x_grid: Array1<f64>,
    /// Vertical grid.
    pub y_grid: Array1<f64>,
    /// Predictions, shape (`y_grid.len()`, `x_grid.len()`).
    pub z: Array2<f64>,
    /// Contour levels, evenly spaced from the smallest to the largest
    /// prediction.
    pub levels: Array1<f64>,
    /// Experimental runs as (x, y) pairs, empty when the overlay is off.
    pub observed: Vec<(f64, f64)>,
    /// Chart title.
    pub title: String,
    /// Colour map name.
    pub colour_map: String,
    /// Figure size in inches.
    pub figure_size: (f64, f64),
    /// Figure resolution.
    pub dpi: u32,
}

impl ContourData {
    /// Predict `model` over the configured grid.
    ///
    /// Without explicit axes, the first two main effects of the model are
    /// used.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] if axes are not given and the model has
    ///   fewer than two main effects, or if `config.points` is below 2
    /// - any error from [`predict_surface_with_policy`]
    pub fn new<S: AsRef<str>>(
        model: &FittedModel,
        x_factor: Option<&str>,
        y_factor: Option<&str>,
        other_factors: &[(S, f64)],
        config: &ContourConfig,
    ) -> Result<Self> {
        if config.points < 2 {
            return Err(Error::invalid_params("contour grid needs at least 2 points"));
        }

        let main_effects: Vec<&str> = model
            .spec()
            .terms()
            .iter()
            .filter(|t| t.order() == 1)
            .map(|t| t.factors()[0].as_str())
            .collect();
        let x_factor = match x_factor {
            Some(name) => name,
            None => *main_effects
                .first()
                .ok_or_else(|| Error::invalid_params("model has no main effect for the x axis"))?,
        };
        let y_factor = match y_factor {
            Some(name) => name,
            None => *main_effects
                .iter()
                .find(|&&name| name != x_factor)
                .ok_or_else(|| Error::invalid_params("model has no main effect for the y axis"))?,
        };

        let x_grid = linspace(config.x_limits.0, config.x_limits.1, config.points);
        let y_grid = linspace(config.y_limits.0, config.y_limits.1, config.points);
        let z = predict_surface_with_policy(
            model,
            x_factor,
            y_factor,
            x_grid.as_slice().unwrap_or_default(),
            y_grid.as_slice().unwrap_or_default(),
            other_factors,
            config.missing_factor_policy,
        )?;

        let low = z.iter().copied().fold(f64::INFINITY, f64::min);
        let high = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let levels = linspace(low, high, config.points);

        let observed = if config.show_experiment_data {
            let xs = model.table().require(x_factor)?;
            let ys = model.table().require(y_factor)?;
            xs.iter().copied().zip(ys.iter().copied()).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            x_factor: x_factor.to_string(),
            y_factor: y_factor.to_string(),
            x_grid,
            y_grid,
            z,
            levels,
            observed,
            title: format!("Contour plot: {}", model.response()),
            colour_map: config.colour_map.clone(),
            figure_size: config.figure_size,
            dpi: config.dpi,
        })
    }
}
