//! Row-partitioned Gauss-Seidel across a lock-step worker group.
//!
//! Every worker holds a full copy of `A`, `b` and `x`; only the *write
//! responsibility* for `x` is partitioned. Worker `k` of `P` relaxes rows
//! `k*n/P .. (k+1)*n/P` (see [`RowPartition`]).
//!
//! # Protocol
//!
//! Before iterating, the coordinator (rank 0) validates the task and
//! broadcasts the verdict ([`validate`]), then broadcasts `n`, `eps`, the
//! iteration budget, `A` and `b` ([`distribute`]). Each sweep ([`iterate`])
//! then runs:
//!
//! ```text
//! p = x
//! relax own rows                      (local)
//! for r in 0..P: broadcast x[rows(r)] from r
//! global = all_reduce_sum(sum over own rows of (x - p)^2)
//! converged = sqrt(global) < eps; broadcast converged from 0
//! m += 1
//! ```
//!
//! Inside a sweep a worker reads the rows of other partitions at the values
//! published at the end of the previous sweep. The result is a block
//! Gauss-Seidel / Jacobi hybrid that still converges under strict diagonal
//! dominance, at a different rate than the sequential order. With a single
//! worker it reduces exactly to the sequential solver.
//!
//! The convergence flag is broadcast from the coordinator so that every
//! worker leaves the loop on the same sweep; a split decision would deadlock
//! the next round of collectives.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::buffers::{self, TaskBuffers};
use crate::comm::{Communicator, LocalGroup, COORDINATOR};
use crate::error::{CommError, SolverError, ValidationError};
use crate::kernel;
use crate::partition::RowPartition;
use crate::traits::LinearSolver;
use crate::types::{
    Algorithm, ConvergenceInfo, DenseMatrix, LinearSystem, SolveOutcome, SolverConfig,
};
use crate::validation::{self, ValidatedShape};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate on the coordinator, then share the verdict and `n` with everyone.
///
/// Only the coordinator looks at `task`; other ranks may pass `None`. A
/// coordinator without a task rejects it. All workers return the same
/// accept/reject decision.
///
/// # Errors
///
/// On rejection the coordinator returns the specific [`ValidationError`];
/// other workers return [`ValidationError::RejectedByCoordinator`].
#[instrument(skip_all, fields(rank = comm.rank(), workers = comm.size()))]
pub fn validate<C: Communicator>(
    comm: &C,
    task: Option<&TaskBuffers>,
) -> Result<ValidatedShape, SolverError> {
    let mut n = 0usize;
    let mut accepted = false;
    let mut rejection = None;

    if comm.is_coordinator() {
        let verdict = match task {
            Some(task) => validation::validate_task(task),
            None => Err(ValidationError::RegionCount {
                kind: "input",
                expected: buffers::INPUT_REGIONS,
                actual: 0,
            }),
        };
        match verdict {
            Ok(shape) => {
                n = shape.n;
                accepted = true;
            }
            Err(e) => {
                debug!(error = %e, "task rejected");
                rejection = Some(e);
            }
        }
    }

    comm.broadcast_usize(&mut n, COORDINATOR)?;
    comm.broadcast_bool(&mut accepted, COORDINATOR)?;

    if accepted {
        Ok(ValidatedShape { n })
    } else {
        Err(rejection
            .unwrap_or(ValidationError::RejectedByCoordinator)
            .into())
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Give every worker an identical copy of the system and configuration.
///
/// The coordinator passes `Some(system)`; other ranks pass `None`. The
/// coordinator's `config` wins. If the coordinator has no system it
/// broadcasts `n = 0` and every worker bails out together.
///
/// # Errors
///
/// [`SolverError::InvalidInput`] when the coordinator had nothing to send,
/// [`SolverError::Communication`] on a failed collective.
#[instrument(skip_all, fields(rank = comm.rank(), workers = comm.size()))]
pub fn distribute<C: Communicator>(
    comm: &C,
    system: Option<&LinearSystem>,
    config: &SolverConfig,
) -> Result<(LinearSystem, SolverConfig), SolverError> {
    let root_system = if comm.is_coordinator() { system } else { None };

    let mut n = root_system.map_or(0, LinearSystem::dim);
    comm.broadcast_usize(&mut n, COORDINATOR)?;
    if n == 0 {
        let err = if comm.is_coordinator() {
            ValidationError::DimensionMismatch("coordinator has no system to distribute".into())
        } else {
            ValidationError::RejectedByCoordinator
        };
        return Err(err.into());
    }

    let mut tolerance = config.tolerance;
    let mut max_iterations = config.max_iterations;
    comm.broadcast_f64(&mut tolerance, COORDINATOR)?;
    comm.broadcast_usize(&mut max_iterations, COORDINATOR)?;

    let (mut a, mut b) = match root_system {
        Some(sys) => (sys.matrix().as_slice().to_vec(), sys.rhs().to_vec()),
        None => (vec![0.0; n * n], vec![0.0; n]),
    };
    comm.broadcast_slice(&mut a, COORDINATOR)?;
    comm.broadcast_slice(&mut b, COORDINATOR)?;
    debug!(n, tolerance, max_iterations, "system distributed");

    let matrix = DenseMatrix::from_row_major(n, a)?;
    Ok((
        LinearSystem::from_validated(matrix, b),
        SolverConfig::new(tolerance, max_iterations),
    ))
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Run the partitioned sweep protocol on this worker.
///
/// Every worker returns an outcome holding the full, synchronized `x`; by
/// convention only the coordinator's is handed to the caller.
///
/// # Errors
///
/// [`SolverError::InvalidInput`] for an out-of-range configuration (raised
/// identically on every worker, before any collective), or
/// [`SolverError::Communication`] on a failed collective.
#[instrument(skip_all, fields(rank = comm.rank(), workers = comm.size(), n = system.dim()))]
pub fn iterate<C: Communicator>(
    comm: &C,
    system: &LinearSystem,
    config: &SolverConfig,
) -> Result<SolveOutcome, SolverError> {
    validation::validate_params(config.tolerance, config.max_iterations)?;

    let start = Instant::now();
    let n = system.dim();
    let tolerance = config.tolerance;
    let partitions = RowPartition::all(n, comm.size());
    let own = partitions[comm.rank()];

    let mut x = vec![1.0; n];
    let mut p = vec![0.0; n];
    let mut history = Vec::with_capacity(config.max_iterations.min(256));
    let mut displacement_norm = f64::INFINITY;
    let mut converged = false;
    let mut m = 0;

    while !converged && m < config.max_iterations {
        p.copy_from_slice(&x);
        kernel::relax_rows(system, &mut x, own.rows());

        // Publish: every owner broadcasts its rows to the rest.
        for (root, part) in partitions.iter().enumerate() {
            comm.broadcast_slice(&mut x[part.rows()], root)?;
        }

        let local = kernel::squared_displacement(&x, &p, own.rows());
        let global = comm.all_reduce_sum(local)?;
        displacement_norm = global.sqrt();
        converged = displacement_norm < tolerance;
        comm.broadcast_bool(&mut converged, COORDINATOR)?;

        history.push(ConvergenceInfo {
            iteration: m,
            displacement_norm,
        });
        debug!(iteration = m, local, displacement_norm, "partitioned sweep");
        m += 1;
    }

    if comm.is_coordinator() {
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
    }

    Ok(SolveOutcome {
        solution: x,
        iterations: m,
        converged,
        displacement_norm,
        wall_time: start.elapsed(),
        convergence_history: history,
        algorithm: Algorithm::PartitionedGaussSeidel,
    })
}

// ---------------------------------------------------------------------------
// PartitionedGaussSeidel
// ---------------------------------------------------------------------------

/// Partitioned solver that runs its own in-process [`LocalGroup`].
///
/// # Example
///
/// ```rust
/// use seidel_solver::partitioned::PartitionedGaussSeidel;
/// use seidel_solver::traits::LinearSolver;
/// use seidel_solver::types::{DenseMatrix, LinearSystem, SolverConfig};
///
/// let a = DenseMatrix::from_rows(&[
///     vec![5.0, 1.0, 1.0],
///     vec![1.0, 6.0, 2.0],
///     vec![0.0, 1.0, 4.0],
/// ])
/// .unwrap();
/// let system = LinearSystem::new(a, vec![1.0, 2.0, 3.0]).unwrap();
///
/// let solver = PartitionedGaussSeidel::new(SolverConfig::new(1e-10, 1000), 2);
/// let outcome = solver.solve(&system).unwrap();
/// assert!(outcome.converged);
/// ```
#[derive(Debug, Clone)]
pub struct PartitionedGaussSeidel {
    /// Tolerance and iteration budget.
    pub config: SolverConfig,
    /// Number of workers to spawn.
    pub workers: usize,
}

impl PartitionedGaussSeidel {
    /// Create a solver that uses `workers` in-process workers.
    pub fn new(config: SolverConfig, workers: usize) -> Self {
        Self { config, workers }
    }

    /// Solver with default configuration.
    pub fn with_workers(workers: usize) -> Self {
        Self::new(SolverConfig::default(), workers)
    }
}

impl LinearSolver for PartitionedGaussSeidel {
    /// Distribute `system` over a fresh worker group, iterate, and return the
    /// coordinator's outcome.
    fn solve(&self, system: &LinearSystem) -> Result<SolveOutcome, SolverError> {
        let group = LocalGroup::new(self.workers)?;
        let config = self.config;

        let results = group.run(|comm| {
            let (local, config) = distribute(&comm, Some(system), &config)?;
            iterate(&comm, &local, &config)
        })?;

        results
            .into_iter()
            .nth(COORDINATOR)
            .ok_or(CommError::InvalidGroupSize(0))?
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::PartitionedGaussSeidel
    }
}
