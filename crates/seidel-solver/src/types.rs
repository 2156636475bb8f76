//! Core types for the dense Gauss-Seidel solvers.
//!
//! Provides [`DenseMatrix`] for contiguous row-major storage, the validated
//! [`LinearSystem`], solver configuration, and result types for convergence
//! tracking.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation;

/// Iteration budget used when the caller does not supply one.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Displacement tolerance used when the caller does not supply one.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DenseMatrix
// ---------------------------------------------------------------------------

/// Square dense matrix stored as one contiguous row-major buffer.
///
/// Entry `(i, j)` lives at `values[i * n + j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DenseMatrix {
    /// Wrap a row-major buffer of `n * n` values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DimensionMismatch`] if `values.len()` is not
    /// `n * n`.
    pub fn from_row_major(n: usize, values: Vec<f64>) -> Result<Self, ValidationError> {
        let expected = n.checked_mul(n).ok_or_else(|| {
            ValidationError::DimensionMismatch(format!("matrix order {n} overflows n*n"))
        })?;
        if values.len() != expected {
            return Err(ValidationError::DimensionMismatch(format!(
                "matrix buffer holds {} values, expected {}x{} = {}",
                values.len(),
                n,
                n,
                expected,
            )));
        }
        Ok(Self { n, values })
    }

    /// Build from nested rows. Every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ValidationError> {
        let n = rows.len();
        let mut values = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ValidationError::DimensionMismatch(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n,
                )));
            }
            values.extend_from_slice(row);
        }
        Ok(Self { n, values })
    }

    /// Identity matrix of order `n`.
    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    /// Diagonal matrix with the given diagonal.
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        let mut values = vec![0.0; n * n];
        for (i, &d) in diag.iter().enumerate() {
            values[i * n + i] = d;
        }
        Self { n, values }
    }

    /// Matrix order.
    #[inline]
    pub fn order(&self) -> usize {
        self.n
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Row `i` as a slice of length `n`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.n;
        &self.values[start..start + self.n]
    }

    /// Underlying row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Dense matrix-vector multiply: `y = A * x`.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `x` and `y` both have length `n`.
    pub fn matvec(&self, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.n, "matvec: x.len() != n");
        debug_assert_eq!(y.len(), self.n, "matvec: y.len() != n");
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row(i).iter().zip(x).map(|(&a, &xj)| a * xj).sum();
        }
    }
}

// ---------------------------------------------------------------------------
// LinearSystem
// ---------------------------------------------------------------------------

/// A validated system `A x = b`.
///
/// Every value of this type is square, finite, and strictly diagonally
/// dominant, so `A[i][i]` is always safe to divide by. The system is never
/// mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    matrix: DenseMatrix,
    rhs: Vec<f64>,
}

impl LinearSystem {
    /// Validate and assemble a system.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by
    /// [`validation::validate_system`].
    pub fn new(matrix: DenseMatrix, rhs: Vec<f64>) -> Result<Self, ValidationError> {
        validation::validate_system(&matrix, &rhs)?;
        Ok(Self { matrix, rhs })
    }

    /// Convenience constructor from a flat row-major buffer.
    pub fn from_row_major(
        n: usize,
        values: Vec<f64>,
        rhs: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        Self::new(DenseMatrix::from_row_major(n, values)?, rhs)
    }

    /// Assemble a system whose data was already validated elsewhere, e.g. a
    /// copy received from the coordinator.
    pub(crate) fn from_validated(matrix: DenseMatrix, rhs: Vec<f64>) -> Self {
        debug_assert_eq!(matrix.order(), rhs.len());
        Self { matrix, rhs }
    }

    /// System dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.rhs.len()
    }

    /// Coefficient matrix `A`.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// Right-hand side `b`.
    #[inline]
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Euclidean norm of the residual `b - A x`.
    pub fn residual_norm(&self, x: &[f64]) -> f64 {
        let mut ax = vec![0.0; self.dim()];
        self.matrix.matvec(x, &mut ax);
        ax.iter()
            .zip(&self.rhs)
            .map(|(&axi, &bi)| (bi - axi) * (bi - axi))
            .sum::<f64>()
            .sqrt()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Convergence parameters, immutable for the duration of a run.
///
/// Deserializes with per-field defaults so partial documents such as
/// `{"tolerance": 1e-9}` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop once the displacement norm `||x_k - x_{k-1}||` drops below this.
    pub tolerance: f64,
    /// Maximum number of sweeps.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Create a configuration.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Replace the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

// ---------------------------------------------------------------------------
// Solver result types
// ---------------------------------------------------------------------------

/// Which solver produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Single-process Gauss-Seidel in natural row order.
    GaussSeidel,
    /// Row-partitioned Gauss-Seidel across a lock-step worker group.
    PartitionedGaussSeidel,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::GaussSeidel => write!(f, "gauss-seidel"),
            Algorithm::PartitionedGaussSeidel => write!(f, "partitioned-gauss-seidel"),
        }
    }
}

/// Per-sweep convergence snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceInfo {
    /// Sweep index (0-based).
    pub iteration: usize,
    /// `||x_k - x_{k-1}||` after this sweep.
    pub displacement_norm: f64,
}

/// Result of a completed run.
///
/// A run that exhausts its budget still produces an outcome with
/// `converged == false` and the last iterate as `solution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Solution vector `x`.
    pub solution: Vec<f64>,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Whether the displacement norm fell below the tolerance.
    pub converged: bool,
    /// Displacement norm of the final sweep.
    pub displacement_norm: f64,
    /// Wall-clock time taken.
    pub wall_time: Duration,
    /// Per-sweep convergence history.
    pub convergence_history: Vec<ConvergenceInfo>,
    /// Algorithm used.
    pub algorithm: Algorithm,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
