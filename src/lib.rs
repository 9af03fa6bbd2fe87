//! # Factorial
//!
//! Linear-model analysis of coded factorial experiments.
//!
//! ## Overview
//!
//! A factorial experiment runs every combination (or a fraction of the
//! combinations) of a few factors, each coded to a standard range such as
//! -1/+1, and records a response. This library provides:
//! - **Design**: coded factors, experiment tables and full factorial grids
//! - **Models**: a small formula language (`y ~ A*B + C`) and least-squares
//!   fitting with standard errors, t tests and goodness of fit
//! - **Pareto ranking**: effects ordered by magnitude, with their sign
//! - **Response surfaces**: predictions over a grid of two factors, ready
//!   for a contour chart
//!
//! Drawing charts, loading datasets and formatting full reports are left to
//! the caller; [`ParetoChart`] and [`ContourData`] carry everything a
//! renderer needs.
//!
//! ## Quick Start
//!
//! ```rust
//! use factorial::{full_factorial_grid, lm, pareto_rank, Factor};
//!
//! let mut table = full_factorial_grid(&[("C", (-1.0, 1.0)), ("T", (-1.0, 1.0))]).unwrap();
//! table.insert(Factor::coded("y", &[5.0, 6.0, 30.0, 33.0])).unwrap();
//!
//! let model = lm("y ~ C*T", &table).unwrap();
//! assert_eq!(model.df_resid(), 0);
//! assert!((model.coefficient("C").unwrap().estimate - 13.0).abs() < 1e-12);
//!
//! // Largest effect last
//! let ranked = pareto_rank(&model);
//! assert_eq!(ranked.last().unwrap().label, "C");
//! ```
//!
//! ## Notation
//!
//! A model with p coefficients fitted to N runs has N - p residual degrees
//! of freedom. With none left (a *saturated* model) the effects are still
//! estimated, but the error variance and everything derived from it is
//! reported as `None`.
//!
//! ## Features
//!
//! - `parallel`: Parallel surface prediction using rayon (default)
//! - `serde`: Enable serialization/deserialization of tables, models and
//!   chart data
//! - `python`: Enable Python bindings via PyO3

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod design;
pub mod error;
pub mod factor;
pub mod model;
pub mod pareto;
#[cfg(feature = "python")]
pub mod python;
pub mod surface;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::design::{
        expand_grid, full_factorial_grid, main_effects, ExperimentTable, GridOrder, MainEffect,
    };
    pub use crate::error::{Error, Result};
    pub use crate::factor::Factor;
    pub use crate::model::{
        design_matrix, fit, fit_with_config, lm, Coefficient, ConfidenceInterval, FTest,
        FitConfig, FittedModel, ModelSpec, Term,
    };
    pub use crate::pareto::{pareto_rank, ParetoChart, ParetoConfig, ParetoEntry, Sign};
    pub use crate::surface::{
        linspace, predict, predict_surface, predict_surface_with_policy, ContourConfig,
        ContourData, MissingFactorPolicy,
    };

    #[cfg(feature = "parallel")]
    pub use crate::parallel::{par_predict_surface, par_predict_surface_with_policy};
}

// Re-export commonly used items at crate root
pub use design::{expand_grid, full_factorial_grid, main_effects, ExperimentTable, GridOrder};
pub use error::{Error, Result};
pub use factor::Factor;
pub use model::{
    design_matrix, fit, fit_with_config, lm, FitConfig, FittedModel, ModelSpec, Term,
};
pub use pareto::{pareto_rank, ParetoChart, ParetoConfig, ParetoEntry, Sign};
pub use surface::{
    linspace, predict, predict_surface, predict_surface_with_policy, ContourConfig, ContourData,
    MissingFactorPolicy,
};

#[cfg(feature = "parallel")]
pub use parallel::{par_predict_surface, par_predict_surface_with_policy};
