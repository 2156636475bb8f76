//! Task lifecycle: validate, pre-process, run, post-process.
//!
//! Each stage consumes the previous stage's value, so a task cannot be
//! pre-processed without first being validated, and the output buffer is
//! only written once a run has produced an outcome.
//!
//! ```text
//! TaskBuffers --validate--> ValidatedTask --pre_process--> PreparedTask
//!             --solve-----> SolveOutcome  --post_process--> TaskBuffers.outputs
//! ```
//!
//! [`run_sequential`] and [`run_partitioned`] chain the four stages for the
//! two solver variants.

use tracing::instrument;

use crate::buffers::{self, TaskBuffers};
use crate::comm::Communicator;
use crate::error::{SolverError, ValidationError};
use crate::partitioned;
use crate::sequential::GaussSeidelSolver;
use crate::types::{DenseMatrix, LinearSystem, SolveOutcome, SolverConfig};
use crate::validation::{self, ValidatedShape};

/// A task that passed [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedTask<'a> {
    task: &'a TaskBuffers,
    shape: ValidatedShape,
}

/// A system and configuration ready to be solved.
#[derive(Debug, Clone)]
pub struct PreparedTask {
    /// The assembled system.
    pub system: LinearSystem,
    /// Configuration with the task's tolerance applied.
    pub config: SolverConfig,
}

/// Stage 1: check region layout, lengths and diagonal dominance.
pub fn validate(task: &TaskBuffers) -> Result<ValidatedTask<'_>, ValidationError> {
    let shape = validation::validate_task(task)?;
    Ok(ValidatedTask { task, shape })
}

impl<'a> ValidatedTask<'a> {
    /// System dimension.
    pub fn n(&self) -> usize {
        self.shape.n
    }

    /// Stage 2: copy the buffers into an owned [`LinearSystem`] and apply the
    /// task's tolerance over `config`.
    pub fn pre_process(self, config: &SolverConfig) -> Result<PreparedTask, ValidationError> {
        let n = self.shape.n;
        let inputs = &self.task.inputs;
        let float = |index: usize, region: &'static str| {
            inputs[index].as_float().ok_or(ValidationError::RegionType {
                region,
                expected: "floating-point",
            })
        };

        let tolerance = float(buffers::TOLERANCE, "tolerance")?[0];
        let matrix = DenseMatrix::from_row_major(n, float(buffers::MATRIX, "matrix")?.to_vec())?;
        let rhs = float(buffers::RHS, "rhs")?.to_vec();

        Ok(PreparedTask {
            system: LinearSystem::from_validated(matrix, rhs),
            config: config.with_tolerance(tolerance),
        })
    }
}

/// Stage 4: copy the solution into the task's output region.
///
/// The final iterate is written whatever its values; a run that got past
/// [`validate`] always produces output. Use
/// [`validate_outcome`](validation::validate_outcome) to inspect it.
///
/// # Errors
///
/// [`ValidationError`] if the output region is missing, not floating-point,
/// or of the wrong length, none of which can happen for a task that passed
/// [`validate`]. The buffer is left untouched in that case.
pub fn post_process(outcome: &SolveOutcome, task: &mut TaskBuffers) -> Result<(), ValidationError> {
    let expected = outcome.solution.len();
    let out = task
        .outputs
        .get_mut(buffers::SOLUTION)
        .ok_or(ValidationError::RegionCount {
            kind: "output",
            expected: buffers::OUTPUT_REGIONS,
            actual: 0,
        })?
        .as_float_mut()
        .ok_or(ValidationError::RegionType {
            region: "solution",
            expected: "floating-point",
        })?;
    if out.len() != expected {
        return Err(ValidationError::DimensionMismatch(format!(
            "solution region holds {} elements, outcome has {}",
            out.len(),
            expected,
        )));
    }
    out.copy_from_slice(&outcome.solution);
    Ok(())
}

/// Run the full lifecycle with the sequential solver.
///
/// # Errors
///
/// [`SolverError::InvalidInput`] if the task is rejected; the output buffer
/// is not written in that case.
#[instrument(skip_all)]
pub fn run_sequential(
    task: &mut TaskBuffers,
    config: &SolverConfig,
) -> Result<SolveOutcome, SolverError> {
    let prepared = validate(task)?.pre_process(config)?;
    let outcome = GaussSeidelSolver::new(prepared.config).solve(&prepared.system)?;
    post_process(&outcome, task)?;
    Ok(outcome)
}

/// Run the full lifecycle as one worker of a partitioned group.
///
/// Every worker calls this with the same `config`. Only the coordinator's
/// `task` is read, and only the coordinator writes the solution into it;
/// other ranks may pass `None`. Once validation accepts the task, every rank
/// returns an identical [`SolveOutcome`].
///
/// # Errors
///
/// On rejection the coordinator returns the specific [`ValidationError`] and
/// every other worker returns [`ValidationError::RejectedByCoordinator`].
#[instrument(skip_all, fields(rank = comm.rank(), workers = comm.size()))]
pub fn run_partitioned<C: Communicator>(
    comm: &C,
    task: Option<&mut TaskBuffers>,
    config: &SolverConfig,
) -> Result<SolveOutcome, SolverError> {
    let task = if comm.is_coordinator() { task } else { None };

    let shape = partitioned::validate(comm, task.as_deref())?;

    // Only the coordinator prepares; a failure here still has to reach
    // `distribute` so the other workers are released.
    let mut prep_error = None;
    let prepared = match task.as_deref() {
        Some(t) => match (ValidatedTask { task: t, shape }).pre_process(config) {
            Ok(prepared) => Some(prepared),
            Err(e) => {
                prep_error = Some(e);
                None
            }
        },
        None => None,
    };

    let distributed = partitioned::distribute(
        comm,
        prepared.as_ref().map(|p| &p.system),
        prepared.as_ref().map_or(config, |p| &p.config),
    );
    let (system, run_config) = match (distributed, prep_error) {
        (Err(_), Some(e)) => return Err(e.into()),
        (distributed, _) => distributed?,
    };

    let outcome = partitioned::iterate(comm, &system, &run_config)?;

    if let Some(task) = task {
        post_process(&outcome, task)?;
    }
    Ok(outcome)
}
