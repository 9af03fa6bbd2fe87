//! Parallel surface prediction.
//!
//! Grid rows are evaluated on the rayon thread pool. Each point is computed
//! by the same arithmetic as [`predict_surface`](crate::predict_surface), so
//! the two agree bit for bit. Enable with the `parallel` feature flag.
//!
//! For the grid sizes of a typical contour chart (a few hundred points) the
//! sequential version is usually as fast.

use log::trace;
use ndarray::{Array2, ArrayView1, Zip};

use crate::error::Result;
use crate::model::FittedModel;
use crate::surface::{MissingFactorPolicy, SurfaceEvaluator};

/// Parallel [`predict_surface`](crate::predict_surface).
///
/// # Errors
///
/// Same as [`predict_surface`](crate::predict_surface).
pub fn par_predict_surface<S: AsRef<str>>(
    model: &FittedModel,
    x_factor: &str,
    y_factor: &str,
    x_grid: &[f64],
    y_grid: &[f64],
    other_factors: &[(S, f64)],
) -> Result<Array2<f64>> {
    par_predict_surface_with_policy(
        model,
        x_factor,
        y_factor,
        x_grid,
        y_grid,
        other_factors,
        MissingFactorPolicy::default(),
    )
}

/// Parallel [`predict_surface_with_policy`](crate::predict_surface_with_policy).
///
/// # Errors
///
/// Same as [`predict_surface_with_policy`](crate::predict_surface_with_policy).
pub fn par_predict_surface_with_policy<S: AsRef<str>>(
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
        "predicting {} x {} surface in parallel over '{x_factor}' and '{y_factor}'",
        y_grid.len(),
        x_grid.len()
    );

    let mut z = Array2::<f64>::zeros((y_grid.len(), x_grid.len()));
    Zip::from(z.rows_mut())
        .and(&ArrayView1::from(y_grid))
        .par_for_each(|mut row, &y| {
            for (cell, &x) in row.iter_mut().zip(x_grid) {
                *cell = evaluator.at(x, y);
            }
        });

    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::full_factorial_grid;
    use crate::error::Error;
    use crate::factor::Factor;
    use crate::model::lm;
    use crate::surface::{linspace, predict_surface, predict_surface_with_policy};

    fn model() -> FittedModel {
        let mut table = full_factorial_grid(&[
            ("A", (-1.0, 1.0)),
            ("B", (-1.0, 1.0)),
            ("C", (-1.0, 1.0)),
        ])
        .unwrap();
        table
            .insert(Factor::coded(
                "y",
                &[12.0, 15.0, 9.0, 14.0, 20.0, 26.0, 17.0, 25.0],
            ))
            .unwrap();
        lm("y ~ A*B*C", &table).unwrap()
    }

    #[test]
    fn test_par_matches_sequential() {
        let model = model();
        let grid = linspace(-3.2, 3.2, 40);
        let grid = grid.as_slice().unwrap();

        let seq = predict_surface(&model, "A", "C", grid, grid, &[("B", 0.5)]).unwrap();
        let par = par_predict_surface(&model, "A", "C", grid, grid, &[("B", 0.5)]).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_par_rectangular_grid() {
        let model = model();
        let none: &[(&str, f64)] = &[];
        let z = par_predict_surface(&model, "B", "A", &[-1.0, 0.0, 1.0], &[-1.0, 1.0], none).unwrap();
        assert_eq!(z.dim(), (2, 3));
    }

    #[test]
    fn test_par_strict_policy() {
        let model = model();
        let none: &[(&str, f64)] = &[];
        let seq = predict_surface_with_policy(
            &model,
            "A",
            "B",
            &[0.0],
            &[0.0],
            none,
            MissingFactorPolicy::Strict,
        );
        let par = par_predict_surface_with_policy(
            &model,
            "A",
            "B",
            &[0.0],
            &[0.0],
            none,
            MissingFactorPolicy::Strict,
        );
        assert_eq!(par, Err(Error::MissingFactor("C".to_string())));
        assert_eq!(seq, par);
    }
}
