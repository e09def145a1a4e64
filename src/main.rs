use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use scatter_matmul::config::{
    Dimensions, InputSource, RunConfig, TransportKind, DEFAULT_COLS, DEFAULT_INNER,
    DEFAULT_OUTPUT, DEFAULT_ROWS,
};
use scatter_matmul::runner::{run_rank, RankOutcome};
use scatter_matmul::transport::LocalUniverse;

#[derive(Parser, Debug)]
#[command(name = "scatter-matmul")]
#[command(about = "Row-partitioned distributed matrix multiplication (C = A x B)")]
#[command(version)]
struct Cli {
    /// Rows of A and C (M)
    #[arg(short = 'm', long, env = "SCATTER_MATMUL_ROWS", default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Columns of A and rows of B (K)
    #[arg(short = 'k', long, env = "SCATTER_MATMUL_INNER", default_value_t = DEFAULT_INNER)]
    inner: usize,

    /// Columns of B and C (N)
    #[arg(short = 'n', long, env = "SCATTER_MATMUL_COLS", default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Seed for random matrix initialization (time-based when omitted)
    #[arg(long, env = "SCATTER_MATMUL_SEED")]
    seed: Option<u64>,

    /// Load A from a text file instead of generating it
    #[arg(long, requires = "matrix_b")]
    matrix_a: Option<PathBuf>,

    /// Load B from a text file instead of generating it
    #[arg(long, requires = "matrix_a")]
    matrix_b: Option<PathBuf>,

    /// Report file written by the coordinator
    #[arg(short, long, env = "SCATTER_MATMUL_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Also save C alone in the loadable text format
    #[arg(long)]
    result: Option<PathBuf>,

    /// Collective transport
    #[arg(short, long, value_enum, env = "SCATTER_MATMUL_TRANSPORT", default_value_t = TransportKind::Local)]
    transport: TransportKind,

    /// Number of ranks for the local transport (mpirun decides for mpi)
    #[arg(short, long, env = "SCATTER_MATMUL_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Give up on a blocked local collective after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let input = match (self.matrix_a, self.matrix_b) {
            (Some(a), Some(b)) => InputSource::Files { a, b },
            _ => InputSource::Random { seed: self.seed },
        };
        RunConfig {
            dims: Dimensions::new(self.rows, self.inner, self.cols),
            input,
            output: self.output,
            result: self.result,
            transport: self.transport,
            workers: self.workers,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Cli::parse().into_config();
    config.validate()?;

    match config.transport {
        TransportKind::Local => run_local(&config),
        TransportKind::Mpi => run_mpi(&config),
    }
}

fn run_local(config: &RunConfig) -> anyhow::Result<()> {
    info!("[Coordinator] Starting local universe with {} workers", config.workers);
    let mut universe = LocalUniverse::new(config.workers);
    if let Some(timeout) = config.timeout {
        universe = universe.with_timeout(timeout);
    }

    let outcomes = universe.run(|world| run_rank(&world, config))?;
    // Report the coordinator's error first; worker errors usually just echo the abort.
    let mut outcomes = outcomes.into_iter();
    match outcomes.next() {
        Some(Ok(RankOutcome::Coordinator(product))) => {
            println!(
                "Computed {}x{} product on {} workers in {:.6}s, report at {}",
                product.c.rows,
                product.c.cols,
                config.workers,
                product.compute_seconds(),
                config.output.display()
            );
        }
        Some(Ok(RankOutcome::Worker(_))) | None => bail!("rank 0 did not act as coordinator"),
        Some(Err(e)) => return Err(e).context("coordinator failed"),
    }
    for (rank, outcome) in outcomes.enumerate() {
        outcome.with_context(|| format!("worker {} failed", rank + 1))?;
    }
    Ok(())
}

#[cfg(feature = "mpi")]
fn run_mpi(config: &RunConfig) -> anyhow::Result<()> {
    use scatter_matmul::transport::{Collective, MpiWorld};

    let world = MpiWorld::initialize()?;
    if world.is_root() {
        info!("[Coordinator] Starting with {} MPI ranks", world.size());
    }
    let outcome = run_rank(&world, config)
        .with_context(|| format!("rank {} failed", world.rank()))?;
    if let RankOutcome::Coordinator(product) = outcome {
        println!(
            "Computed {}x{} product on {} ranks in {:.6}s, report at {}",
            product.c.rows,
            product.c.cols,
            world.size(),
            product.compute_seconds(),
            config.output.display()
        );
    }
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn run_mpi(_config: &RunConfig) -> anyhow::Result<()> {
    bail!("this build has no MPI support; rebuild with `--features mpi`")
}
