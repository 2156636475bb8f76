//! Solver trait.
//!
//! Both the sequential and the partitioned solver implement [`LinearSolver`],
//! so callers (and the equivalence tests) can run either one behind the same
//! interface.

use crate::error::SolverError;
use crate::types::{Algorithm, LinearSystem, SolveOutcome, SolverConfig};

/// Core trait that every solver variant implements.
pub trait LinearSolver: Send + Sync {
    /// Solve `A x = b` for a validated system.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] on invalid configuration or, for solvers that
    /// coordinate several workers, on a communication failure. Running out of
    /// iterations is reported through [`SolveOutcome::converged`].
    fn solve(&self, system: &LinearSystem) -> Result<SolveOutcome, SolverError>;

    /// Tolerance and iteration budget this solver runs with.
    fn config(&self) -> &SolverConfig;

    /// Return the algorithm identifier for this solver.
    fn algorithm(&self) -> Algorithm;
}
