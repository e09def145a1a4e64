//! MPI transport: one OS process per rank, launched by `mpirun`.

use mpi::datatype::{Partition as MpiPartition, PartitionMut};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use mpi::Count;

use super::{check_partition, Collective, COORDINATOR_RANK};
use crate::error::{MatmulError, TransportError};
use crate::matrix::Element;
use crate::partition::Partition;

pub struct MpiWorld {
    // Finalizes MPI on drop, so it must outlive `world`.
    _universe: mpi::environment::Universe,
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
}

impl MpiWorld {
    pub fn initialize() -> Result<Self, MatmulError> {
        let universe = mpi::initialize()
            .ok_or_else(|| MatmulError::Config("MPI was already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiWorld {
            _universe: universe,
            world,
            rank,
            size,
        })
    }
}

fn to_counts(values: &[usize]) -> Result<Vec<Count>, TransportError> {
    values
        .iter()
        .map(|&v| Count::try_from(v).map_err(|_| TransportError::CountOverflow(v)))
        .collect()
}

impl Collective for MpiWorld {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast(&self, buf: &mut [Element]) -> Result<(), TransportError> {
        let root = self.world.process_at_rank(COORDINATOR_RANK as i32);
        root.broadcast_into(buf);
        Ok(())
    }

    fn scatter_varcount(
        &self,
        send: Option<&[Element]>,
        partition: &Partition,
        recv: &mut [Element],
    ) -> Result<(), TransportError> {
        check_partition(
            "scatter",
            self.rank,
            self.size,
            partition,
            recv.len(),
            send.map(<[Element]>::len),
        )?;
        let root = self.world.process_at_rank(COORDINATOR_RANK as i32);
        match send {
            Some(send) if self.is_root() => {
                let counts = to_counts(partition.counts())?;
                let displs = to_counts(partition.offsets())?;
                let source = MpiPartition::new(send, counts, displs);
                root.scatter_varcount_into_root(&source, recv);
            }
            _ => root.scatter_varcount_into(recv),
        }
        Ok(())
    }

    fn gather_varcount(
        &self,
        send: &[Element],
        partition: &Partition,
        recv: Option<&mut [Element]>,
    ) -> Result<(), TransportError> {
        check_partition(
            "gather",
            self.rank,
            self.size,
            partition,
            send.len(),
            recv.as_ref().map(|r| r.len()),
        )?;
        let root = self.world.process_at_rank(COORDINATOR_RANK as i32);
        match recv {
            Some(recv) if self.is_root() => {
                let counts = to_counts(partition.counts())?;
                let displs = to_counts(partition.offsets())?;
                let mut target = PartitionMut::new(recv, counts, displs);
                root.gather_varcount_into_root(send, &mut target);
            }
            _ => root.gather_varcount_into(send),
        }
        Ok(())
    }

    fn abort(&self, code: i32) {
        log::error!("[mpi] rank {} aborting run with code {}", self.rank, code);
        self.world.abort(code)
    }
}
