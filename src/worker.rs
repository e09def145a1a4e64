use std::ops::Range;
use std::time::Instant;

use log::{debug, info};

use crate::config::Dimensions;
use crate::error::{MatmulError, Result};
use crate::kernel::multiply_block;
use crate::matrix::{Element, Matrix};
use crate::partition::Partition;
use crate::transport::Collective;

/// What one rank did during a multiplication pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassStats {
    pub dims: Dimensions,
    /// Global rows of A and C this rank owned
    pub rows: Range<usize>,
    /// Wall-clock seconds spent in the local multiply
    pub compute_seconds: f64,
}

pub struct Worker<'w, C: Collective> {
    rank: usize,
    world: &'w C,
}

impl<'w, C: Collective> Worker<'w, C> {
    /// Create a new worker
    pub fn new(world: &'w C) -> Self {
        Worker {
            rank: world.rank(),
            world,
        }
    }

    /// Get the worker's rank
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn world(&self) -> &'w C {
        self.world
    }

    /// Take part in a pass as a non-coordinator rank
    pub fn process_work(&self) -> Result<PassStats> {
        info!("[Worker {}] Waiting for work assignment...", self.rank);
        self.run_pass(None, None)
    }

    /// The collective sequence every rank runs. Only the coordinator passes
    /// `inputs` (full A and B) and `output` (storage for the full C).
    pub(crate) fn run_pass(
        &self,
        inputs: Option<(&Matrix, &Matrix)>,
        output: Option<&mut [Element]>,
    ) -> Result<PassStats> {
        let dims = self.exchange_dimensions(inputs.map(|(a, b)| (a.rows, a.cols, b.cols)))?;
        let size = self.world.size();

        // Same row assignment twice: rows of K elements for A, of N for C.
        let a_partition = Partition::new(dims.rows, size, dims.inner)?;
        let c_partition = a_partition.with_unit_width(dims.cols)?;
        let rows = a_partition.row_range(self.rank);
        debug!(
            "[Worker {}] Assigned rows [{}, {}) of {}",
            self.rank, rows.start, rows.end, dims.rows
        );

        let mut local_a = vec![0; a_partition.count(self.rank)];
        self.world.scatter_varcount(
            inputs.map(|(a, _)| a.data.as_slice()),
            &a_partition,
            &mut local_a,
        )?;

        let mut local_b = match inputs {
            Some((_, b)) => b.data.clone(),
            None => vec![0; dims.inner * dims.cols],
        };
        self.world.broadcast(&mut local_b)?;
        debug!(
            "[Worker {}] Received {} rows of A and B {}x{}",
            self.rank,
            rows.len(),
            dims.inner,
            dims.cols
        );

        let start = Instant::now();
        let local_c = multiply_block(&local_a, &local_b, dims.inner, dims.cols)?;
        let compute_seconds = start.elapsed().as_secs_f64();
        debug!(
            "[Worker {}] Computed {}x{} block in {:.6}s",
            self.rank,
            rows.len(),
            dims.cols,
            compute_seconds
        );

        self.world.gather_varcount(&local_c, &c_partition, output)?;
        info!("[Worker {}] Work complete ({} rows)", self.rank, rows.len());

        Ok(PassStats {
            dims,
            rows,
            compute_seconds,
        })
    }

    fn exchange_dimensions(&self, shape: Option<(usize, usize, usize)>) -> Result<Dimensions> {
        let mut wire = match shape {
            Some((rows, inner, cols)) => Dimensions::new(rows, inner, cols).to_wire(),
            None => [0; 3],
        };
        self.world.broadcast(&mut wire)?;
        let dims = Dimensions::from_wire(wire)?;
        if dims.inner == 0 || dims.cols == 0 {
            return Err(MatmulError::Config(format!(
                "rank {} received degenerate dimensions {}x{}x{}",
                self.rank, dims.rows, dims.inner, dims.cols
            )));
        }
        Ok(dims)
    }
}
