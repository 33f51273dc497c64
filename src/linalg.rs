use ndarray::{s, Array2, Zip};
use thiserror::Error;

use std::cmp::Ordering;

//pivot entries below this magnitude are treated as zero
const PIVOT_TOL: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix is singular")]
pub struct SingularMatrix;

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
/// Signals `SingularMatrix` instead of producing garbage on rank deficiency.
pub fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>, SingularMatrix> {
    let n = matrix.nrows();
    assert_eq!(n, matrix.ncols(), "invert requires a square matrix");

    let mut work = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for j in 0..n {
        //find pivot row
        let pivot = (j..n)
            .max_by(|&r1, &r2| {
                work[[r1, j]]
                    .abs()
                    .partial_cmp(&work[[r2, j]].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .filter(|&r| work[[r, j]].abs() > PIVOT_TOL)
            .ok_or(SingularMatrix)?;

        //swap row j and pivot
        if pivot != j {
            let (row_p, row_j) = work.multi_slice_mut((s![pivot, ..], s![j, ..]));
            Zip::from(row_p).and(row_j).for_each(std::mem::swap);
            let (row_p, row_j) = inv.multi_slice_mut((s![pivot, ..], s![j, ..]));
            Zip::from(row_p).and(row_j).for_each(std::mem::swap);
        }

        //normalize pivot row
        let div = work[[j, j]];
        work.row_mut(j).mapv_inplace(|v| v / div);
        inv.row_mut(j).mapv_inplace(|v| v / div);

        //eliminate column j from every other row
        for i in 0..n {
            if i == j {
                continue;
            }
            let factor = work[[i, j]];
            if factor == 0.0_f64 {
                continue;
            }
            let row_j = work.row(j).to_owned();
            work.row_mut(i)
                .zip_mut_with(&row_j, |a, b| *a -= factor * b);
            let inv_row_j = inv.row(j).to_owned();
            inv.row_mut(i)
                .zip_mut_with(&inv_row_j, |a, b| *a -= factor * b);
        }
    }

    Ok(inv)
}
