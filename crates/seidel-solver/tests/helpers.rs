//! Shared test helpers for the seidel-solver integration test suite.
//!
//! Provides seeded random system generators, a direct reference solver, and
//! vector comparison utilities.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use parking_lot::Mutex;

use seidel_solver::buffers::TaskBuffers;
use seidel_solver::comm::{Communicator, LocalGroup};
use seidel_solver::error::SolverError;
use seidel_solver::pipeline;
use seidel_solver::types::{DenseMatrix, LinearSystem, SolveOutcome, SolverConfig};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Row-major `n x n` matrix with off-diagonals in `[-1, 1)` and each diagonal
/// set to `1 + |row off-diagonal sum| + U[0, 1)`, so every row is strictly
/// dominant.
pub fn random_diag_dominant(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = vec![0.0; n * n];
    for i in 0..n {
        let mut off = 0.0;
        for j in 0..n {
            if i != j {
                let v: f64 = rng.gen_range(-1.0..1.0);
                a[i * n + j] = v;
                off += v.abs();
            }
        }
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        a[i * n + i] = sign * (off + 1.0 + rng.gen::<f64>());
    }
    a
}

/// Vector of length `n` with entries in `[-10, 10)`.
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect()
}

/// Random dominant system of order `n`.
pub fn random_system(n: usize, seed: u64) -> LinearSystem {
    LinearSystem::from_row_major(n, random_diag_dominant(n, seed), random_vector(n, seed + 1))
        .expect("generator produces dominant systems")
}

/// Task buffers for a random dominant system of order `n`.
pub fn random_task(n: usize, tolerance: f64, seed: u64) -> TaskBuffers {
    TaskBuffers::for_system(
        n,
        tolerance,
        random_diag_dominant(n, seed),
        random_vector(n, seed + 1),
    )
}

// ---------------------------------------------------------------------------
// Group runner
// ---------------------------------------------------------------------------

/// Run the partitioned lifecycle on `workers` in-process workers, handing
/// `task` to the coordinator only. Returns every worker's result in rank
/// order.
pub fn run_partitioned_task(
    task: &mut TaskBuffers,
    workers: usize,
    config: &SolverConfig,
) -> Vec<Result<SolveOutcome, SolverError>> {
    let slot = Mutex::new(Some(task));
    LocalGroup::new(workers)
        .expect("positive worker count")
        .run(|comm| {
            let mine = if comm.is_coordinator() {
                slot.lock().take()
            } else {
                None
            };
            pipeline::run_partitioned(&comm, mine, config)
        })
        .expect("group runs to completion")
}

// ---------------------------------------------------------------------------
// Reference solver
// ---------------------------------------------------------------------------

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
pub fn dense_solve(matrix: &DenseMatrix, rhs: &[f64]) -> Vec<f64> {
    let n = matrix.order();
    let mut a: Vec<Vec<f64>> = (0..n).map(|i| matrix.row(i).to_vec()).collect();
    let mut b = rhs.to_vec();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap();
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[i][j] * x[j]).sum();
        x[i] = (b[i] - tail) / a[i][i];
    }
    x
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Largest element-wise absolute difference.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
