//! Dense Gauss-Seidel solvers for diagonally dominant systems.
//!
//! This crate solves `Ax = b` for a strictly row-diagonally-dominant dense
//! matrix `A`, either in a single thread or split by rows across a group of
//! workers that advance in lock step.
//!
//! # Available Solvers
//!
//! | Solver | Workers | Method |
//! |--------|---------|--------|
//! | [`GaussSeidelSolver`](sequential::GaussSeidelSolver) | 1 | rows relaxed in order, in place |
//! | [`PartitionedGaussSeidel`](partitioned::PartitionedGaussSeidel) | `P` | each worker relaxes its row block, blocks exchanged every sweep |
//!
//! Tasks arriving as typed buffers go through [`pipeline`], which validates
//! them, builds the system, runs a solver, and writes the solution back.
//!
//! # Example
//!
//! ```rust
//! use seidel_solver::buffers::TaskBuffers;
//! use seidel_solver::pipeline;
//! use seidel_solver::types::SolverConfig;
//!
//! let mut task = TaskBuffers::for_system(
//!     2,
//!     1e-10,
//!     vec![4.0, 1.0, 2.0, 5.0],
//!     vec![5.0, 7.0],
//! );
//! let outcome = pipeline::run_sequential(&mut task, &SolverConfig::default()).unwrap();
//! assert!(outcome.converged);
//! let x = task.solution().unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-8 && (x[1] - 1.0).abs() < 1e-8);
//! ```

pub mod buffers;
pub mod comm;
pub mod error;
pub mod partition;
pub mod partitioned;
pub mod pipeline;
pub mod sequential;
pub mod traits;
pub mod types;
pub mod validation;

mod kernel;

pub use comm::{Communicator, LocalGroup};
pub use error::{CommError, SolverError, ValidationError};
pub use partitioned::PartitionedGaussSeidel;
pub use sequential::GaussSeidelSolver;
pub use traits::LinearSolver;
pub use types::{DenseMatrix, LinearSystem, SolveOutcome, SolverConfig};
