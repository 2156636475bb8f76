//! Single-process Gauss-Seidel solver.
//!
//! Reference implementation of the fixed-point iteration. Rows are relaxed
//! in natural order `0..n`, each update seeing the values already written
//! earlier in the same sweep:
//!
//! ```text
//! x_0 = (1, 1, ..., 1)
//! loop:
//!     p = x
//!     for i in 0..n:
//!         x[i] = (b[i] - sum_{j != i} a[i][j] x[j]) / a[i][i]
//!     if ||x - p|| < eps or m == max_iterations: stop
//! ```
//!
//! Exhausting the iteration budget is not an error: the last iterate is
//! returned with [`SolveOutcome::converged`] set to `false`.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::error::SolverError;
use crate::kernel;
use crate::traits::LinearSolver;
use crate::types::{Algorithm, ConvergenceInfo, LinearSystem, SolveOutcome, SolverConfig};
use crate::validation;

/// Sequential Gauss-Seidel solver.
///
/// # Example
///
/// ```rust
/// use seidel_solver::sequential::GaussSeidelSolver;
/// use seidel_solver::types::{DenseMatrix, LinearSystem, SolverConfig};
///
/// let a = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
/// let system = LinearSystem::new(a, vec![1.0, 2.0]).unwrap();
///
/// let solver = GaussSeidelSolver::new(SolverConfig::new(1e-10, 1000));
/// let outcome = solver.solve(&system).unwrap();
/// assert!(outcome.converged);
/// assert!(system.residual_norm(&outcome.solution) < 1e-8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GaussSeidelSolver {
    /// Tolerance and iteration budget.
    pub config: SolverConfig,
}

impl GaussSeidelSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Run the iteration to convergence or budget exhaustion.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidInput`] if the tolerance or iteration budget is
    /// out of range. The system itself is valid by construction.
    #[instrument(skip(self, system), fields(n = system.dim()))]
    pub fn solve(&self, system: &LinearSystem) -> Result<SolveOutcome, SolverError> {
        validation::validate_params(self.config.tolerance, self.config.max_iterations)?;

        let start = Instant::now();
        let n = system.dim();
        let tolerance = self.config.tolerance;

        let mut x = vec![1.0; n];
        let mut p = vec![0.0; n];
        let mut history = Vec::with_capacity(self.config.max_iterations.min(256));
        let mut displacement_norm = f64::INFINITY;
        let mut converged = false;
        let mut m = 0;

        while !converged && m < self.config.max_iterations {
            p.copy_from_slice(&x);
            kernel::relax_rows(system, &mut x, 0..n);

            displacement_norm = kernel::squared_displacement(&x, &p, 0..n).sqrt();
            history.push(ConvergenceInfo {
                iteration: m,
                displacement_norm,
            });
            debug!(iteration = m, displacement_norm, "gauss-seidel sweep");

            converged = displacement_norm < tolerance;
            m += 1;
        }

        if converged {
            info!(iterations = m, displacement_norm, "converged");
        } else {
            warn!(
                iterations = m,
                displacement_norm,
                tolerance,
                "iteration budget exhausted before convergence",
            );
        }

        Ok(SolveOutcome {
            solution: x,
            iterations: m,
            converged,
            displacement_norm,
            wall_time: start.elapsed(),
            convergence_history: history,
            algorithm: Algorithm::GaussSeidel,
        })
    }
}

impl LinearSolver for GaussSeidelSolver {
    fn solve(&self, system: &LinearSystem) -> Result<SolveOutcome, SolverError> {
        GaussSeidelSolver::solve(self, system)
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::GaussSeidel
    }
}
