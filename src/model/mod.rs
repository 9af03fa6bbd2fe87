//! Linear models over experiment tables.
//!
//! # Overview
//!
//! - [`ModelSpec`]: which terms a model contains, parsed from a formula
//!   such as `"y ~ A*B + C"`
//! - [`design_matrix`]: the N x p matrix of term columns
//! - [`fit`] / [`lm`]: least-squares estimates with standard errors and
//!   goodness of fit
//!
//! # Formula syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `A + B` | main effects A and B |
//! | `A:B` | the A x B interaction only |
//! | `A*B` | `A + B + A:B` |
//! | `A*B*C` | all main effects and interactions of A, B and C |
//! | `- 1`, `+ 0` | drop the intercept |
//!
//! # Example
//!
//! ```
//! use factorial::{lm, ExperimentTable};
//!
//! let table = ExperimentTable::new()
//!     .with_column("A", &[-1.0, 1.0, -1.0, 1.0]).unwrap()
//!     .with_column("B", &[-1.0, -1.0, 1.0, 1.0]).unwrap()
//!     .with_column("y", &[52.0, 74.0, 62.0, 80.0]).unwrap();
//!
//! let model = lm("y ~ A*B", &table).unwrap();
//! assert_eq!(model.spec().labels(), ["Intercept", "A", "B", "A:B"]);
//! ```

mod fit;
mod matrix;
mod spec;
pub mod stats;
mod types;

pub use fit::{fit, fit_with_config, lm};
pub use matrix::{design_matrix, design_row};
pub use spec::{ModelSpec, Term, INTERCEPT_LABEL};
pub use types::{Coefficient, ConfidenceInterval, FTest, FitConfig, FittedModel, ResidualLine};
