//! Numerical core shared by the sequential and partitioned solvers.
//!
//! Both variants run the same recurrence over a row range,
//!
//! ```text
//! x[i] = (b[i] - sum_{j != i} a[i][j] * x[j]) / a[i][i]
//! ```
//!
//! updating `x` in place so that rows later in the range observe values
//! already written earlier in the same sweep.

use std::ops::Range;

use crate::types::LinearSystem;

/// Relax every row in `rows` once, in ascending order, writing into `x`.
///
/// Entries of `x` outside `rows` are read but never written.
#[inline]
pub(crate) fn relax_rows(system: &LinearSystem, x: &mut [f64], rows: Range<usize>) {
    let matrix = system.matrix();
    let rhs = system.rhs();
    for i in rows {
        let row = matrix.row(i);
        let mut off_diagonal = 0.0;
        for (j, (&a, &xj)) in row.iter().zip(x.iter()).enumerate() {
            if j != i {
                off_diagonal += a * xj;
            }
        }
        x[i] = (rhs[i] - off_diagonal) / row[i];
    }
}

/// Sum of squared differences `sum (x[i] - p[i])^2` over `rows`.
#[inline]
pub(crate) fn squared_displacement(x: &[f64], p: &[f64], rows: Range<usize>) -> f64 {
    x[rows.clone()]
        .iter()
        .zip(&p[rows])
        .map(|(&xi, &pi)| (xi - pi) * (xi - pi))
        .sum()
}
