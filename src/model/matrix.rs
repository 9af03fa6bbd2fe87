//! Design-matrix assembly.

use ndarray::{Array1, Array2};

use super::spec::ModelSpec;
use crate::design::ExperimentTable;
use crate::error::Result;

/// Build the N x p design matrix for `spec` from the columns of `table`.
///
/// Column j is the elementwise product of the factor columns named by the
/// j-th term of [`ModelSpec::columns`]; the intercept is a column of ones.
///
/// # Errors
///
/// Returns [`Error::UnknownFactor`](crate::Error::UnknownFactor) if a term
/// names a column the table does not have.
///
/// # Example
///
/// ```
/// use factorial::{design_matrix, ExperimentTable, ModelSpec};
///
/// let table = ExperimentTable::new()
///     .with_column("A", &[-1.0, 1.0, -1.0, 1.0]).unwrap()
///     .with_column("B", &[-1.0, -1.0, 1.0, 1.0]).unwrap();
/// let spec = ModelSpec::parse("A*B", table.names()).unwrap();
///
/// let x = design_matrix(&table, &spec).unwrap();
/// assert_eq!(x.dim(), (4, 4));
/// assert_eq!(x.column(3).to_vec(), vec![1.0, -1.0, -1.0, 1.0]);
/// ```
pub fn design_matrix(table: &ExperimentTable, spec: &ModelSpec) -> Result<Array2<f64>> {
    let columns = spec.columns();
    let mut x = Array2::<f64>::ones((table.runs(), columns.len()));

    for (j, term) in columns.iter().enumerate() {
        let mut column = x.column_mut(j);
        for name in term.factors() {
            column *= table.require(name)?;
        }
    }

    Ok(x)
}

/// Build one design-matrix row from individual factor values.
///
/// # Errors
///
/// Propagates any error returned by `value_of`.
pub fn design_row<F>(spec: &ModelSpec, mut value_of: F) -> Result<Array1<f64>>
where
    F: FnMut(&str) -> Result<f64>,
{
    let columns = spec.columns();
    let mut row = Array1::<f64>::zeros(columns.len());
    for (j, term) in columns.iter().enumerate() {
        row[j] = term.evaluate(&mut value_of)?;
    }
    Ok(row)
}
