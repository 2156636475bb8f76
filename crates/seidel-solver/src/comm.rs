//! Collective-communication context for lock-step worker groups.
//!
//! A [`Communicator`] is the capability a worker uses to talk to the rest of
//! its group: broadcast of scalars and slices from a root rank, and a global
//! sum-reduction. Every method is a synchronization barrier that all workers
//! must reach, in the same order, before any of them returns.
//!
//! [`LocalGroup`] provides an in-process implementation: one scoped thread
//! per rank, synchronized through a shared [`Barrier`] and `parking_lot`
//! mutex-guarded exchange slots.
//!
//! There is no timeout. A worker that never reaches a collective stalls the
//! whole group.

use std::cell::Cell;
use std::sync::Barrier;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::error::CommError;

/// Rank of the coordinator, the worker that owns the task buffers.
pub const COORDINATOR: usize = 0;

/// Collective operations over an ordered, fixed-size group of workers.
pub trait Communicator {
    /// This worker's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Whether this worker is rank [`COORDINATOR`].
    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// Broadcast an index-sized integer from `root` into `value` on every worker.
    fn broadcast_usize(&self, value: &mut usize, root: usize) -> Result<(), CommError>;

    /// Broadcast a float from `root`.
    fn broadcast_f64(&self, value: &mut f64, root: usize) -> Result<(), CommError>;

    /// Broadcast a flag from `root`.
    fn broadcast_bool(&self, value: &mut bool, root: usize) -> Result<(), CommError>;

    /// Broadcast `buf` from `root`. Every worker must pass a slice of the
    /// same length.
    fn broadcast_slice(&self, buf: &mut [f64], root: usize) -> Result<(), CommError>;

    /// Sum `local` across all workers. Every worker receives the same value.
    fn all_reduce_sum(&self, local: f64) -> Result<f64, CommError>;
}

// ---------------------------------------------------------------------------
// In-process implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Payload {
    Usize(usize),
    F64(f64),
    Bool(bool),
    Slice(Vec<f64>),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Usize(_) => "usize",
            Payload::F64(_) => "f64",
            Payload::Bool(_) => "bool",
            Payload::Slice(_) => "slice",
        }
    }
}

struct Shared {
    size: usize,
    barrier: Barrier,
    slot: Mutex<Option<Payload>>,
    partials: Mutex<Vec<f64>>,
}

impl Shared {
    fn new(size: usize) -> Self {
        Self {
            size,
            barrier: Barrier::new(size),
            slot: Mutex::new(None),
            partials: Mutex::new(vec![0.0; size]),
        }
    }
}

/// A fixed-size group of in-process workers running in lock-step.
///
/// # Example
///
/// ```rust
/// use seidel_solver::comm::{Communicator, LocalGroup};
///
/// let group = LocalGroup::new(3).unwrap();
/// let sums = group.run(|comm| comm.all_reduce_sum(comm.rank() as f64)).unwrap();
/// for sum in sums {
///     assert_eq!(sum.unwrap(), 3.0);
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LocalGroup {
    size: usize,
}

impl LocalGroup {
    /// Create a group of `size` workers.
    ///
    /// # Errors
    ///
    /// [`CommError::InvalidGroupSize`] if `size == 0`.
    pub fn new(size: usize) -> Result<Self, CommError> {
        if size == 0 {
            return Err(CommError::InvalidGroupSize(size));
        }
        Ok(Self { size })
    }

    /// Run `f` once per rank, each on its own thread, and collect the results
    /// in rank order.
    ///
    /// Each invocation gets a fresh set of exchange slots, so results never
    /// leak between runs.
    ///
    /// # Errors
    ///
    /// [`CommError::Spawn`] if a worker thread cannot be started, or
    /// [`CommError::WorkerPanicked`] if a worker panicked. A panicking worker
    /// leaves its peers blocked at the next barrier, so the latter is only
    /// observed when the panic happens after the last collective.
    #[instrument(skip(self, f), fields(workers = self.size))]
    pub fn run<F, R>(&self, f: F) -> Result<Vec<R>, CommError>
    where
        F: Fn(LocalCommunicator<'_>) -> R + Sync,
        R: Send,
    {
        let shared = Shared::new(self.size);
        let f = &f;

        std::thread::scope(|scope| -> Result<Vec<R>, CommError> {
            let mut handles = Vec::with_capacity(self.size);
            for rank in 0..self.size {
                let comm = LocalCommunicator {
                    rank,
                    shared: &shared,
                    collectives: Cell::new(0),
                };
                let handle = std::thread::Builder::new()
                    .name(format!("seidel-worker-{rank}"))
                    .spawn_scoped(scope, move || f(comm))
                    .map_err(|e| CommError::Spawn {
                        rank,
                        reason: e.to_string(),
                    })?;
                handles.push(handle);
            }
            debug!(workers = handles.len(), "worker group started");

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| handle.join().map_err(|_| CommError::WorkerPanicked { rank }))
                .collect()
        })
    }
}

/// Per-worker handle into a [`LocalGroup`].
pub struct LocalCommunicator<'a> {
    rank: usize,
    shared: &'a Shared,
    collectives: Cell<u64>,
}

impl LocalCommunicator<'_> {
    /// Number of collectives this worker has completed.
    pub fn collective_count(&self) -> u64 {
        self.collectives.get()
    }

    fn check_root(&self, root: usize) -> Result<(), CommError> {
        if root >= self.shared.size {
            return Err(CommError::InvalidRoot {
                root,
                size: self.shared.size,
            });
        }
        Ok(())
    }

    /// Publish `outgoing` on the root, hand a copy to everyone else.
    ///
    /// Returns `None` on the root. The second barrier keeps the root from
    /// overwriting the slot before every receiver has read it.
    fn exchange(
        &self,
        root: usize,
        expected: &'static str,
        outgoing: impl FnOnce() -> Payload,
    ) -> Result<Option<Payload>, CommError> {
        self.check_root(root)?;

        if self.rank == root {
            *self.shared.slot.lock() = Some(outgoing());
        }
        self.shared.barrier.wait();
        let received = if self.rank == root {
            None
        } else {
            self.shared.slot.lock().clone()
        };
        self.shared.barrier.wait();
        self.collectives.set(self.collectives.get() + 1);

        if self.rank == root {
            return Ok(None);
        }
        match received {
            Some(payload) if payload.kind() == expected => Ok(Some(payload)),
            Some(payload) => Err(CommError::PayloadMismatch {
                rank: self.rank,
                expected,
                found: payload.kind(),
            }),
            None => Err(CommError::PayloadMismatch {
                rank: self.rank,
                expected,
                found: "nothing",
            }),
        }
    }
}

impl Communicator for LocalCommunicator<'_> {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast_usize(&self, value: &mut usize, root: usize) -> Result<(), CommError> {
        let v = *value;
        if let Some(Payload::Usize(received)) = self.exchange(root, "usize", || Payload::Usize(v))? {
            *value = received;
        }
        Ok(())
    }

    fn broadcast_f64(&self, value: &mut f64, root: usize) -> Result<(), CommError> {
        let v = *value;
        if let Some(Payload::F64(received)) = self.exchange(root, "f64", || Payload::F64(v))? {
            *value = received;
        }
        Ok(())
    }

    fn broadcast_bool(&self, value: &mut bool, root: usize) -> Result<(), CommError> {
        let v = *value;
        if let Some(Payload::Bool(received)) = self.exchange(root, "bool", || Payload::Bool(v))? {
            *value = received;
        }
        Ok(())
    }

    fn broadcast_slice(&self, buf: &mut [f64], root: usize) -> Result<(), CommError> {
        let outgoing = || Payload::Slice(buf.to_vec());
        let received = self.exchange(root, "slice", outgoing)?;
        if let Some(Payload::Slice(data)) = received {
            if data.len() != buf.len() {
                return Err(CommError::LengthMismatch {
                    rank: self.rank,
                    sent: data.len(),
                    expected: buf.len(),
                });
            }
            buf.copy_from_slice(&data);
        }
        Ok(())
    }

    fn all_reduce_sum(&self, local: f64) -> Result<f64, CommError> {
        self.shared.partials.lock()[self.rank] = local;
        self.shared.barrier.wait();
        // Rank order, so every worker computes a bit-identical total.
        let total: f64 = self.shared.partials.lock().iter().sum();
        self.shared.barrier.wait();
        self.collectives.set(self.collectives.get() + 1);
        Ok(total)
    }
}
