use ndarray::Array2;

use std::collections::HashSet;

use crate::error::SolverError;
use crate::model::Model;
use crate::var::Variable;

/// Collect the columns of `matrix` that correspond to `vars`, in order.
///
/// The columns of `matrix` are 1:1 with the model's canonical variable order.
/// Errors with `DimensionMismatch` if the column count disagrees with the
/// model's variable count, and with `VariableNotFound` for a variable the
/// model does not hold. Pure; neither input is touched.
pub fn slice_columns(
    mdl: &Model,
    matrix: &Array2<f64>,
    vars: &[Variable],
) -> Result<Array2<f64>, SolverError> {
    let num_vars = mdl.variables().len();
    if matrix.ncols() != num_vars {
        return Err(SolverError::DimensionMismatch {
            expected: num_vars,
            found: matrix.ncols(),
        });
    }

    let index_map = mdl.variable_index_map();
    let mut out = Array2::<f64>::zeros((matrix.nrows(), vars.len()));
    for (j, var) in vars.iter().enumerate() {
        let idx = *index_map
            .get(var)
            .ok_or_else(|| SolverError::VariableNotFound {
                name: var.name().to_string(),
            })?;
        out.column_mut(j).assign(&matrix.column(idx));
    }

    Ok(out)
}

/// Order-preserving set difference: the variables of `a` that are not in `b`.
pub fn set_difference(a: &[Variable], b: &[Variable]) -> Vec<Variable> {
    let in_b: HashSet<&Variable> = b.iter().collect();
    a.iter().filter(|var| !in_b.contains(var)).cloned().collect()
}
