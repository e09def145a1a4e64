//! Run configuration: matrix dimensions, where the inputs come from, where
//! the report goes, and which transport carries the collectives.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{MatmulError, Result};
use crate::matrix::{Element, Matrix};

pub const DEFAULT_ROWS: usize = 500;
pub const DEFAULT_INNER: usize = 300;
pub const DEFAULT_COLS: usize = 500;
pub const DEFAULT_OUTPUT: &str = "matrix_output.txt";

/// Shape of one run: A is `rows x inner`, B is `inner x cols`, C is `rows x cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: usize,
    pub inner: usize,
    pub cols: usize,
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions {
            rows: DEFAULT_ROWS,
            inner: DEFAULT_INNER,
            cols: DEFAULT_COLS,
        }
    }
}

impl Dimensions {
    pub fn new(rows: usize, inner: usize, cols: usize) -> Self {
        Dimensions { rows, inner, cols }
    }

    /// Dimensions of `a * b`, if the product is defined.
    pub fn of(a: &Matrix, b: &Matrix) -> Result<Self> {
        if a.cols != b.rows {
            return Err(MatmulError::Config(format!(
                "matrix dimensions incompatible: A is {}x{}, B is {}x{}",
                a.rows, a.cols, b.rows, b.cols
            )));
        }
        Ok(Dimensions::new(a.rows, a.cols, b.cols))
    }

    pub fn validate(&self) -> Result<()> {
        if self.inner == 0 || self.cols == 0 {
            return Err(MatmulError::Config(format!(
                "inner and column dimensions must be at least 1, got K={} N={}",
                self.inner, self.cols
            )));
        }
        Ok(())
    }

    pub fn to_wire(self) -> [Element; 3] {
        [self.rows as Element, self.inner as Element, self.cols as Element]
    }

    pub fn from_wire(wire: [Element; 3]) -> Result<Self> {
        let field = |v: Element| {
            usize::try_from(v)
                .map_err(|_| MatmulError::Config(format!("received invalid dimension {}", v)))
        };
        Ok(Dimensions::new(field(wire[0])?, field(wire[1])?, field(wire[2])?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// One thread per rank inside this process
    Local,
    /// One process per rank, launched with mpirun
    Mpi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Uniform values in [0, 9]; a time-derived seed when `seed` is `None`
    Random { seed: Option<u64> },
    /// Whitespace-separated integer text files, one row per line
    Files { a: PathBuf, b: PathBuf },
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dims: Dimensions,
    pub input: InputSource,
    pub output: PathBuf,
    pub result: Option<PathBuf>,
    pub transport: TransportKind,
    pub workers: usize,
    pub timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            dims: Dimensions::default(),
            input: InputSource::Random { seed: None },
            output: PathBuf::from(DEFAULT_OUTPUT),
            result: None,
            transport: TransportKind::Local,
            workers: 1,
            timeout: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(MatmulError::Config("worker count must be at least 1".into()));
        }
        if let InputSource::Random { .. } = self.input {
            self.dims.validate()?;
        }
        Ok(())
    }

    /// Produce A and B on the coordinator.
    pub fn load_inputs(&self) -> Result<(Matrix, Matrix)> {
        match &self.input {
            InputSource::Random { seed } => {
                let seed = seed.unwrap_or_else(clock_seed);
                log::debug!("[Coordinator] Seeding matrix initialization with {}", seed);
                let mut rng = StdRng::seed_from_u64(seed);
                let a = Matrix::random(self.dims.rows, self.dims.inner, &mut rng);
                let b = Matrix::random(self.dims.inner, self.dims.cols, &mut rng);
                Ok((a, b))
            }
            InputSource::Files { a, b } => {
                let a = Matrix::load_from_file(a)?;
                let b = Matrix::load_from_file(b)?;
                Dimensions::of(&a, &b)?.validate()?;
                Ok((a, b))
            }
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
