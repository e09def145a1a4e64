//! Collective communication between the ranks of one run.
//!
//! Every operation is rooted at [`COORDINATOR_RANK`] and must be called by all
//! ranks in the same order. Buffers are role-dependent: the root passes the
//! full source (scatter) or destination (gather), everybody else passes `None`.

pub mod local;
#[cfg(feature = "mpi")]
pub mod mpi_world;

pub use local::{LocalUniverse, LocalWorld};
#[cfg(feature = "mpi")]
pub use mpi_world::MpiWorld;

use crate::error::TransportError;
use crate::matrix::Element;
use crate::partition::Partition;

/// Rank that owns the full matrices and roots every collective.
pub const COORDINATOR_RANK: usize = 0;

pub trait Collective {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == COORDINATOR_RANK
    }

    /// Copy the root's `buf` into `buf` on every rank.
    fn broadcast(&self, buf: &mut [Element]) -> Result<(), TransportError>;

    /// Split the root's `send` by `partition`; each rank receives its
    /// `partition.count(rank)` elements into `recv`.
    fn scatter_varcount(
        &self,
        send: Option<&[Element]>,
        partition: &Partition,
        recv: &mut [Element],
    ) -> Result<(), TransportError>;

    /// Place every rank's `send` at `partition.offset(rank)` of the root's `recv`.
    fn gather_varcount(
        &self,
        send: &[Element],
        partition: &Partition,
        recv: Option<&mut [Element]>,
    ) -> Result<(), TransportError>;

    /// Stop every rank's participation in the run.
    fn abort(&self, code: i32);
}

/// Checks shared by every backend before any data moves.
pub(crate) fn check_partition(
    op: &'static str,
    rank: usize,
    world: usize,
    partition: &Partition,
    local_len: usize,
    root_len: Option<usize>,
) -> Result<(), TransportError> {
    if partition.worker_count() != world {
        return Err(TransportError::PartitionSize {
            partition: partition.worker_count(),
            world,
        });
    }
    if local_len != partition.count(rank) {
        return Err(TransportError::BufferMismatch {
            op,
            rank,
            expected: partition.count(rank),
            got: local_len,
        });
    }
    if rank == COORDINATOR_RANK {
        match root_len {
            None => return Err(TransportError::MissingRootBuffer { op }),
            Some(len) if len != partition.total_elements() => {
                return Err(TransportError::BufferMismatch {
                    op,
                    rank,
                    expected: partition.total_elements(),
                    got: len,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
