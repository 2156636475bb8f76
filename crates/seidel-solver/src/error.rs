//! Error types for the solver crate.
//!
//! Two tiers exist. [`ValidationError`] is the rejection tier: it is raised
//! before any iteration starts and names the offending region or row.
//! [`CommError`] covers misuse of the collective-communication context.
//! Both convert into [`SolverError`] via `From`.
//!
//! Exhausting the iteration budget is *not* an error; it is reported through
//! [`SolveOutcome::converged`](crate::types::SolveOutcome::converged).

/// Primary error type for solver operations.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The caller supplied a problem that failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A collective operation could not be completed.
    #[error("communication failure: {0}")]
    Communication(#[from] CommError),
}

/// Validation errors for solver inputs.
///
/// These are raised eagerly before any computation begins so that callers get
/// clear diagnostics rather than mysterious numerical failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The task did not carry the expected number of input or output regions.
    #[error("expected {expected} {kind} region(s), got {actual}")]
    RegionCount {
        /// `"input"` or `"output"`.
        kind: &'static str,
        /// Required number of regions.
        expected: usize,
        /// Number of regions supplied.
        actual: usize,
    },

    /// A region holds the wrong element type.
    #[error("region `{region}` must hold {expected} elements")]
    RegionType {
        /// Name of the region.
        region: &'static str,
        /// Expected element type.
        expected: &'static str,
    },

    /// A region's declared element count is inconsistent with the problem.
    #[error("region `{region}` declares {declared} elements, expected {expected}")]
    DeclaredLength {
        /// Name of the region.
        region: &'static str,
        /// Element count declared by the caller.
        declared: usize,
        /// Element count implied by the problem dimension.
        expected: usize,
    },

    /// Dimensions are inconsistent (e.g. rhs length vs matrix order).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A value is NaN or infinite where a finite number is required.
    #[error("non-finite value detected: {0}")]
    NonFiniteValue(String),

    /// A diagonal coefficient is exactly zero.
    #[error("zero diagonal entry in row {row}")]
    ZeroDiagonal {
        /// Offending row.
        row: usize,
    },

    /// Row `row` is not strictly diagonally dominant.
    #[error(
        "row {row} is not strictly diagonally dominant (|diag|={diagonal:.6e} <= off-diagonal sum {off_diagonal_sum:.6e})"
    )]
    NotDiagonallyDominant {
        /// Offending row.
        row: usize,
        /// Magnitude of the diagonal entry.
        diagonal: f64,
        /// Sum of magnitudes of the other entries in the row.
        off_diagonal_sum: f64,
    },

    /// A parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value (as a string for flexibility).
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },

    /// Matrix order exceeds the implementation limit.
    #[error("matrix order {n} exceeds maximum supported {max_dim}")]
    MatrixTooLarge {
        /// Requested order.
        n: usize,
        /// Maximum supported order.
        max_dim: usize,
    },

    /// The coordinator rejected the task; the reason is only known on rank 0.
    #[error("task rejected by coordinator")]
    RejectedByCoordinator,
}

/// Errors raised by the collective-communication context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommError {
    /// A worker group must contain at least one worker.
    #[error("invalid worker group size {0}")]
    InvalidGroupSize(usize),

    /// The root rank of a collective is not a member of the group.
    #[error("root rank {root} out of range for group of {size}")]
    InvalidRoot {
        /// Requested root.
        root: usize,
        /// Group size.
        size: usize,
    },

    /// A broadcast slice has a different length on the receiver than on the root.
    #[error("broadcast length mismatch on rank {rank}: root sent {sent}, receiver holds {expected}")]
    LengthMismatch {
        /// Receiving rank.
        rank: usize,
        /// Elements sent by the root.
        sent: usize,
        /// Elements the receiver expected.
        expected: usize,
    },

    /// Workers disagreed on which collective they were executing.
    #[error("collective mismatch on rank {rank}: expected {expected}, found {found}")]
    PayloadMismatch {
        /// Receiving rank.
        rank: usize,
        /// Payload kind the receiver asked for.
        expected: &'static str,
        /// Payload kind the root published.
        found: &'static str,
    },

    /// A worker thread panicked before returning its result.
    #[error("worker {rank} panicked")]
    WorkerPanicked {
        /// Rank of the failed worker.
        rank: usize,
    },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker {rank}: {reason}")]
    Spawn {
        /// Rank of the worker that could not be started.
        rank: usize,
        /// OS error text.
        reason: String,
    },
}
