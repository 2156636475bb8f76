//! Integration tests for task rejection.
//!
//! A malformed task must be rejected by both lifecycles with the same error,
//! whatever the worker count, and its output region must stay untouched.

mod helpers;

use seidel_solver::buffers::{self, BufferRegion, TaskBuffers};
use seidel_solver::error::{SolverError, ValidationError};
use seidel_solver::pipeline;
use seidel_solver::types::SolverConfig;

use helpers::{random_task, run_partitioned_task};

const WORKER_COUNTS: [usize; 4] = [1, 2, 4, 6];

fn good_task() -> TaskBuffers {
    TaskBuffers::for_system(
        3,
        1e-8,
        vec![4.0, 1.0, 1.0, 1.0, 5.0, 2.0, 0.0, 1.0, 3.0],
        vec![6.0, 8.0, 4.0],
    )
}

/// Assert that both lifecycles reject `task` with `expected` on the
/// coordinator and [`ValidationError::RejectedByCoordinator`] elsewhere.
fn assert_rejected(task: &TaskBuffers, expected: impl Fn(&ValidationError) -> bool) {
    let config = SolverConfig::default();

    let mut seq_task = task.clone();
    match pipeline::run_sequential(&mut seq_task, &config) {
        Err(SolverError::InvalidInput(e)) => assert!(expected(&e), "sequential: {e:?}"),
        other => panic!("sequential accepted a bad task: {other:?}"),
    }
    assert_eq!(seq_task.outputs, task.outputs, "sequential wrote to a rejected task");

    for workers in WORKER_COUNTS {
        let mut par_task = task.clone();
        let results = run_partitioned_task(&mut par_task, workers, &config);
        assert_eq!(results.len(), workers);

        match &results[0] {
            Err(SolverError::InvalidInput(e)) => {
                assert!(expected(e), "workers={workers}: {e:?}")
            }
            other => panic!("workers={workers}: coordinator accepted a bad task: {other:?}"),
        }
        for r in &results[1..] {
            assert!(
                matches!(
                    r,
                    Err(SolverError::InvalidInput(ValidationError::RejectedByCoordinator))
                ),
                "workers={workers}: {r:?}"
            );
        }
        assert_eq!(
            par_task.outputs, task.outputs,
            "workers={workers}: wrote to a rejected task"
        );
    }
}

// ---------------------------------------------------------------------------
// Region layout
// ---------------------------------------------------------------------------

#[test]
fn test_missing_input_region() {
    let mut task = good_task();
    task.inputs.pop();
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::RegionCount { kind: "input", expected: 4, actual: 3 })
    });
}

#[test]
fn test_task_assembled_without_rhs() {
    let mut task = TaskBuffers::new();
    task.push_input(BufferRegion::int(vec![2]))
        .push_input(BufferRegion::float(vec![1e-6]))
        .push_input(BufferRegion::float(vec![3.0, 1.0, 1.0, 3.0]))
        .push_output(BufferRegion::zeros(2));
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::RegionCount { kind: "input", expected: 4, actual: 3 })
    });

    task.push_input(BufferRegion::float(vec![4.0, 4.0]));
    let outcome = pipeline::run_sequential(&mut task, &SolverConfig::default()).unwrap();
    assert!(outcome.converged);
}

#[test]
fn test_extra_output_region() {
    let mut task = good_task();
    task.push_output(BufferRegion::zeros(3));
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::RegionCount { kind: "output", expected: 1, actual: 2 })
    });
}

#[test]
fn test_float_dimension_region() {
    let mut task = good_task();
    task.inputs[buffers::DIMENSION] = BufferRegion::float(vec![3.0]);
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::RegionType { region: "dimension", .. })
    });
}

#[test]
fn test_integer_tolerance_region() {
    let mut task = good_task();
    task.inputs[buffers::TOLERANCE] = BufferRegion::int(vec![1]);
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::RegionType { region: "tolerance", .. })
    });
}

// ---------------------------------------------------------------------------
// Dimension and lengths
// ---------------------------------------------------------------------------

#[test]
fn test_zero_dimension() {
    let task = TaskBuffers::for_system(0, 1e-6, vec![], vec![]);
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::ParameterOutOfRange { name, .. } if name == "n")
    });
}

#[test]
fn test_negative_dimension() {
    let mut task = good_task();
    task.inputs[buffers::DIMENSION] = BufferRegion::int(vec![-3]);
    assert_rejected(&task, |e| matches!(e, ValidationError::ParameterOutOfRange { .. }));
}

#[test]
fn test_oversized_dimension() {
    let mut task = good_task();
    task.inputs[buffers::DIMENSION] = BufferRegion::int(vec![1 << 20]);
    assert_rejected(&task, |e| matches!(e, ValidationError::MatrixTooLarge { .. }));
}

#[test]
fn test_short_matrix_region() {
    let mut task = good_task();
    task.inputs[buffers::MATRIX] = BufferRegion::float(vec![4.0, 1.0, 1.0, 1.0, 5.0, 2.0]);
    assert_rejected(&task, |e| {
        matches!(
            e,
            ValidationError::DeclaredLength { region: "matrix", declared: 6, expected: 9 }
        )
    });
}

#[test]
fn test_short_rhs_region() {
    let mut task = good_task();
    task.inputs[buffers::RHS] = BufferRegion::float(vec![6.0, 8.0]);
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::DeclaredLength { region: "rhs", declared: 2, expected: 3 })
    });
}

#[test]
fn test_wrong_output_length() {
    let mut task = good_task();
    task.outputs[buffers::SOLUTION] = BufferRegion::zeros(4);
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::DeclaredLength { region: "solution", .. })
    });
}

#[test]
fn test_declared_length_disagrees_with_data() {
    let mut task = good_task();
    let rhs = task.inputs[buffers::RHS].clone();
    task.inputs[buffers::RHS] = BufferRegion::float(vec![6.0, 8.0]).with_declared_len(3);
    assert_rejected(&task, |e| matches!(e, ValidationError::DimensionMismatch(_)));

    task.inputs[buffers::RHS] = rhs.with_declared_len(2);
    assert_rejected(&task, |e| matches!(e, ValidationError::DeclaredLength { .. }));
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[test]
fn test_non_positive_tolerance() {
    for tol in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
        let mut task = good_task();
        task.inputs[buffers::TOLERANCE] = BufferRegion::float(vec![tol]);
        assert_rejected(&task, |e| {
            matches!(e, ValidationError::ParameterOutOfRange { name, .. } if name == "tolerance")
        });
    }
}

#[test]
fn test_non_finite_matrix_entry() {
    let mut task = good_task();
    let mut a = task.inputs[buffers::MATRIX].as_float().unwrap().to_vec();
    a[5] = f64::NAN;
    task.inputs[buffers::MATRIX] = BufferRegion::float(a);
    assert_rejected(&task, |e| matches!(e, ValidationError::NonFiniteValue(_)));
}

#[test]
fn test_zero_diagonal() {
    let task = TaskBuffers::for_system(
        3,
        1e-6,
        vec![4.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 3.0],
        vec![1.0, 1.0, 1.0],
    );
    assert_rejected(&task, |e| *e == ValidationError::ZeroDiagonal { row: 1 });
}

#[test]
fn test_equal_diagonal_is_not_strictly_dominant() {
    // Row 2: |2| == |1| + |1|.
    let task = TaskBuffers::for_system(
        3,
        1e-6,
        vec![4.0, 1.0, 1.0, 1.0, 5.0, 2.0, 1.0, -1.0, 2.0],
        vec![1.0, 1.0, 1.0],
    );
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::NotDiagonallyDominant { row: 2, .. })
    });
}

#[test]
fn test_first_failing_row_is_reported() {
    let task = TaskBuffers::for_system(
        3,
        1e-6,
        vec![4.0, 1.0, 1.0, 3.0, 1.0, 0.0, 5.0, 5.0, 1.0],
        vec![1.0, 1.0, 1.0],
    );
    assert_rejected(&task, |e| {
        matches!(e, ValidationError::NotDiagonallyDominant { row: 1, .. })
    });
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

#[test]
fn test_random_dominant_tasks_accepted() {
    for (n, seed) in [(1, 3), (4, 5), (9, 7), (24, 11)] {
        let task = random_task(n, 1e-8, seed);
        assert_eq!(pipeline::validate(&task).unwrap().n(), n);
    }
}
