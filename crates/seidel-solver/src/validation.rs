//! Input validation for solver operations.
//!
//! All validation functions run eagerly before any computation begins, ensuring
//! callers receive clear diagnostics instead of a silently diverging
//! iteration. Every public function returns [`ValidationError`] on failure,
//! which converts into [`SolverError::InvalidInput`] via `From`.
//!
//! The central check is strict row diagonal dominance,
//! `|a_ii| > sum_{j != i} |a_ij|` for every row. It guarantees both that the
//! Gauss-Seidel iteration converges and that every diagonal entry is safe to
//! divide by.
//!
//! # Limits
//!
//! | Resource      | Limit      | Constant          |
//! |---------------|------------|-------------------|
//! | Dimension     | 16,384     | [`MAX_DIM`]       |
//! | Iterations    | 1,000,000  | [`MAX_ITERATIONS`]|
//!
//! [`SolverError::InvalidInput`]: crate::error::SolverError::InvalidInput

use tracing::warn;

use crate::buffers::{self, BufferRegion, TaskBuffers};
use crate::error::ValidationError;
use crate::types::{DenseMatrix, SolveOutcome};

// ---------------------------------------------------------------------------
// Resource limits
// ---------------------------------------------------------------------------

/// Maximum system dimension. The matrix is dense, so memory grows as `n^2`.
pub const MAX_DIM: usize = 16_384;

/// Maximum solver iterations to prevent runaway computation.
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Shape information established by [`validate_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedShape {
    /// System dimension.
    pub n: usize,
}

// ---------------------------------------------------------------------------
// Task buffer validation
// ---------------------------------------------------------------------------

/// Validate a raw task before any computation.
///
/// Performs the following checks in order:
///
/// 1. Exactly 4 input regions and 1 output region.
/// 2. The dimension region holds exactly one positive integer `n <= MAX_DIM`.
/// 3. Declared lengths: tolerance 1, matrix `n*n`, rhs `n`, output `n`, and
///    each region's data matches its declared length.
/// 4. The tolerance is finite and positive.
/// 5. Matrix and rhs entries are finite.
/// 6. No zero diagonal and strict diagonal dominance in every row.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first violation found.
pub fn validate_task(task: &TaskBuffers) -> Result<ValidatedShape, ValidationError> {
    // 1. Region counts
    if task.inputs.len() != buffers::INPUT_REGIONS {
        return Err(ValidationError::RegionCount {
            kind: "input",
            expected: buffers::INPUT_REGIONS,
            actual: task.inputs.len(),
        });
    }
    if task.outputs.len() != buffers::OUTPUT_REGIONS {
        return Err(ValidationError::RegionCount {
            kind: "output",
            expected: buffers::OUTPUT_REGIONS,
            actual: task.outputs.len(),
        });
    }

    // 2. Dimension
    let n = read_dimension(&task.inputs[buffers::DIMENSION])?;
    let nn = n * n;

    // 3. Declared lengths
    let tolerance = float_region(&task.inputs[buffers::TOLERANCE], "tolerance", 1)?;
    let matrix = float_region(&task.inputs[buffers::MATRIX], "matrix", nn)?;
    let rhs = float_region(&task.inputs[buffers::RHS], "rhs", n)?;
    float_region(&task.outputs[buffers::SOLUTION], "solution", n)?;

    // 4. Tolerance
    validate_tolerance(tolerance[0])?;

    // 5. Finiteness
    check_finite(matrix, "matrix")?;
    check_finite(rhs, "rhs")?;

    // 6. Diagonal dominance
    check_row_dominance(matrix, n)?;

    Ok(ValidatedShape { n })
}

fn read_dimension(region: &BufferRegion) -> Result<usize, ValidationError> {
    let values = region.as_int().ok_or(ValidationError::RegionType {
        region: "dimension",
        expected: "integer",
    })?;
    check_lengths(region, "dimension", 1)?;

    let raw = values[0];
    if raw <= 0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "n".into(),
            value: raw.to_string(),
            expected: format!("[1, {MAX_DIM}]"),
        });
    }
    let n = usize::try_from(raw).map_err(|_| ValidationError::MatrixTooLarge {
        n: usize::MAX,
        max_dim: MAX_DIM,
    })?;
    if n > MAX_DIM {
        return Err(ValidationError::MatrixTooLarge { n, max_dim: MAX_DIM });
    }
    Ok(n)
}

fn float_region<'a>(
    region: &'a BufferRegion,
    name: &'static str,
    expected: usize,
) -> Result<&'a [f64], ValidationError> {
    let values = region.as_float().ok_or(ValidationError::RegionType {
        region: name,
        expected: "floating-point",
    })?;
    check_lengths(region, name, expected)?;
    Ok(values)
}

fn check_lengths(
    region: &BufferRegion,
    name: &'static str,
    expected: usize,
) -> Result<(), ValidationError> {
    if region.declared_len() != expected {
        return Err(ValidationError::DeclaredLength {
            region: name,
            declared: region.declared_len(),
            expected,
        });
    }
    if region.actual_len() != region.declared_len() {
        return Err(ValidationError::DimensionMismatch(format!(
            "region `{}` declares {} elements but holds {}",
            name,
            region.declared_len(),
            region.actual_len(),
        )));
    }
    Ok(())
}

fn check_finite(values: &[f64], name: &str) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ValidationError::NonFiniteValue(format!(
            "{}[{}] = {}",
            name, i, values[i],
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Diagonal dominance
// ---------------------------------------------------------------------------

/// Check that every row of `matrix` has a non-zero, strictly dominant diagonal.
///
/// # Errors
///
/// [`ValidationError::ZeroDiagonal`] or
/// [`ValidationError::NotDiagonallyDominant`] naming the first offending row.
pub fn check_diagonal_dominance(matrix: &DenseMatrix) -> Result<(), ValidationError> {
    check_row_dominance(matrix.as_slice(), matrix.order())
}

fn check_row_dominance(values: &[f64], n: usize) -> Result<(), ValidationError> {
    for i in 0..n {
        let row = &values[i * n..(i + 1) * n];
        let diag = row[i];
        if diag == 0.0 {
            warn!(row = i, "zero diagonal entry");
            return Err(ValidationError::ZeroDiagonal { row: i });
        }

        let off_diagonal_sum: f64 = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, v)| v.abs())
            .sum();
        if diag.abs() <= off_diagonal_sum {
            warn!(
                row = i,
                diagonal = diag.abs(),
                off_diagonal_sum,
                "matrix is not strictly diagonally dominant"
            );
            return Err(ValidationError::NotDiagonallyDominant {
                row: i,
                diagonal: diag.abs(),
                off_diagonal_sum,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Assembled system validation
// ---------------------------------------------------------------------------

/// Validate an assembled matrix and right-hand side.
///
/// Checks that the matrix is non-empty and within [`MAX_DIM`], that `rhs` has
/// matching length, that all entries are finite, and diagonal dominance.
///
/// # Errors
///
/// Returns [`ValidationError`] on the first failing check.
pub fn validate_system(matrix: &DenseMatrix, rhs: &[f64]) -> Result<(), ValidationError> {
    let n = matrix.order();
    if n == 0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "n".into(),
            value: "0".into(),
            expected: format!("[1, {MAX_DIM}]"),
        });
    }
    if n > MAX_DIM {
        return Err(ValidationError::MatrixTooLarge { n, max_dim: MAX_DIM });
    }
    if rhs.len() != n {
        return Err(ValidationError::DimensionMismatch(format!(
            "rhs length {} does not match matrix order {}",
            rhs.len(),
            n,
        )));
    }
    check_finite(matrix.as_slice(), "matrix")?;
    check_finite(rhs, "rhs")?;
    check_diagonal_dominance(matrix)
}

// ---------------------------------------------------------------------------
// Solver parameter validation
// ---------------------------------------------------------------------------

/// Validate a convergence tolerance: finite and strictly positive.
pub fn validate_tolerance(tolerance: f64) -> Result<(), ValidationError> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "tolerance".into(),
            value: format!("{tolerance:.2e}"),
            expected: "finite positive value".into(),
        });
    }
    Ok(())
}

/// Validate solver convergence parameters.
///
/// # Rules
///
/// - `tolerance` must be finite and positive.
/// - `max_iterations` must be in `[1, MAX_ITERATIONS]`.
///
/// # Errors
///
/// Returns [`ValidationError::ParameterOutOfRange`] if either parameter is
/// outside its valid range.
pub fn validate_params(tolerance: f64, max_iterations: usize) -> Result<(), ValidationError> {
    validate_tolerance(tolerance)?;

    if max_iterations == 0 || max_iterations > MAX_ITERATIONS {
        return Err(ValidationError::ParameterOutOfRange {
            name: "max_iterations".into(),
            value: max_iterations.to_string(),
            expected: format!("[1, {}]", MAX_ITERATIONS),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Output validation (post-solve)
// ---------------------------------------------------------------------------

/// Validate a solve outcome after computation completes.
///
/// 1. No `NaN` or `Inf` in the solution vector.
/// 2. The final displacement norm is finite.
/// 3. At least one sweep was performed.
///
/// # Errors
///
/// Returns [`ValidationError`] if the output is corrupted.
pub fn validate_outcome(outcome: &SolveOutcome) -> Result<(), ValidationError> {
    check_finite(&outcome.solution, "solution")?;

    if !outcome.displacement_norm.is_finite() {
        return Err(ValidationError::NonFiniteValue(format!(
            "displacement_norm = {}",
            outcome.displacement_norm,
        )));
    }

    if outcome.iterations == 0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "iterations".into(),
            value: "0".into(),
            expected: ">= 1".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
