//! Per-rank entry point. Every rank calls [`run_rank`] with the same
//! configuration; the coordinator branch additionally produces the inputs and
//! writes the report.

use log::{error, info};

use crate::config::RunConfig;
use crate::coordinator::{Coordinator, Product};
use crate::error::{MatmulError, Result, TransportError};
use crate::report::ReportSink;
use crate::transport::Collective;
use crate::worker::{PassStats, Worker};

/// Exit code handed to `abort` when a rank gives up on the run.
pub const ABORT_CODE: i32 = 1;

#[derive(Debug, Clone)]
pub enum RankOutcome {
    Coordinator(Product),
    Worker(PassStats),
}

impl RankOutcome {
    pub fn stats(&self) -> &PassStats {
        match self {
            RankOutcome::Coordinator(product) => &product.stats,
            RankOutcome::Worker(stats) => stats,
        }
    }
}

pub fn run_rank<C: Collective>(world: &C, config: &RunConfig) -> Result<RankOutcome> {
    let outcome = if world.is_root() {
        run_coordinator(world, config).map(RankOutcome::Coordinator)
    } else {
        Worker::new(world).process_work().map(RankOutcome::Worker)
    };
    outcome.map_err(|e| abort_run(world, e))
}

fn run_coordinator<C: Collective>(world: &C, config: &RunConfig) -> Result<Product> {
    config.validate()?;
    // Acquire the sink before any collective so a failure stops everyone up front.
    let mut sink = ReportSink::create(&config.output)?;
    let (a, b) = config.load_inputs()?;

    let coordinator = Coordinator::new(world)?;
    let product = coordinator.multiply_matrices(&a, &b)?;

    sink.write_report(&a, &b, &product.c, product.compute_seconds())?;
    info!("[Coordinator] Report written to {}", config.output.display());
    if let Some(path) = &config.result {
        product.c.save_to_file(path)?;
        info!("[Coordinator] Result matrix saved to {}", path.display());
    }
    Ok(product)
}

/// Tear down every rank's participation, unless a peer already did.
fn abort_run<C: Collective>(world: &C, err: MatmulError) -> MatmulError {
    error!("[Rank {}] {}", world.rank(), err);
    if !matches!(err, MatmulError::Transport(TransportError::Aborted { .. })) {
        world.abort(ABORT_CODE);
    }
    err
}
