use log::info;

use crate::config::Dimensions;
use crate::error::{MatmulError, Result};
use crate::matrix::Matrix;
use crate::transport::{Collective, COORDINATOR_RANK};
use crate::worker::{PassStats, Worker};

/// Result of a distributed multiplication, available on the coordinator only.
#[derive(Debug, Clone)]
pub struct Product {
    pub c: Matrix,
    pub stats: PassStats,
}

impl Product {
    /// Seconds the coordinator spent in its own local multiply
    pub fn compute_seconds(&self) -> f64 {
        self.stats.compute_seconds
    }
}

/// Rank 0's view of a run: it owns the full matrices and doubles as worker 0.
pub struct Coordinator<'w, C: Collective> {
    worker: Worker<'w, C>,
}

impl<'w, C: Collective> Coordinator<'w, C> {
    /// Create a new coordinator; only valid on the coordinator rank
    pub fn new(world: &'w C) -> Result<Self> {
        if world.rank() != COORDINATOR_RANK {
            return Err(MatmulError::Config(format!(
                "coordinator must run on rank {}, not rank {}",
                COORDINATOR_RANK,
                world.rank()
            )));
        }
        Ok(Coordinator {
            worker: Worker::new(world),
        })
    }

    /// Number of ranks computing blocks, the coordinator included
    pub fn worker_count(&self) -> usize {
        self.worker.world().size()
    }

    /// Multiply `a * b` across every rank of the world
    pub fn multiply_matrices(&self, a: &Matrix, b: &Matrix) -> Result<Product> {
        let dims = Dimensions::of(a, b)?;
        dims.validate()?;
        info!(
            "[Coordinator] Matrix A: {}x{}, Matrix B: {}x{}, {} workers",
            a.rows,
            a.cols,
            b.rows,
            b.cols,
            self.worker_count()
        );

        let mut c = Matrix::new(dims.rows, dims.cols);
        let stats = self.worker.run_pass(Some((a, b)), Some(c.data.as_mut_slice()))?;
        info!(
            "[Coordinator] Gathered {}x{} result, local multiply took {:.6}s",
            c.rows, c.cols, stats.compute_seconds
        );

        Ok(Product { c, stats })
    }
}
