use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("data length {len} does not match dimensions {rows}x{cols}")]
    LengthMismatch { len: usize, rows: usize, cols: usize },
    #[error("matrix dimensions incompatible: {a_rows}x{a_cols} * {b_rows}x{b_cols}")]
    Incompatible {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },
    #[error("index out of bounds: ({row}, {col}) for matrix {rows}x{cols}")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("row chunk out of bounds: start={start}, num_rows={len}, total_rows={rows}")]
    ChunkOutOfBounds { start: usize, len: usize, rows: usize },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse value {value:?} on line {line}")]
    Parse { line: usize, value: String },
    #[error("inconsistent column count: expected {expected}, found {found} on line {line}")]
    Ragged {
        expected: usize,
        found: usize,
        line: usize,
    },
    #[error("matrix file {0} is empty")]
    Empty(PathBuf),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PartitionError {
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("unit width must be at least 1")]
    ZeroWidth,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{op}: buffer holds {got} elements, partition expects {expected} on rank {rank}")]
    BufferMismatch {
        op: &'static str,
        rank: usize,
        expected: usize,
        got: usize,
    },
    #[error("partition covers {partition} ranks but the world has {world}")]
    PartitionSize { partition: usize, world: usize },
    #[error("{op}: root must supply a buffer")]
    MissingRootBuffer { op: &'static str },
    #[error("run aborted by rank {source_rank} with code {code}")]
    Aborted { source_rank: usize, code: i32 },
    #[error("rank {0} lost its connection to the other ranks")]
    Disconnected(usize),
    #[error("rank {rank} received an unexpected {got} message from rank {from} during {op}")]
    Protocol {
        rank: usize,
        from: usize,
        op: &'static str,
        got: &'static str,
    },
    #[error("rank {rank} timed out after {millis} ms waiting in {op}")]
    Timeout {
        rank: usize,
        op: &'static str,
        millis: u128,
    },
    #[error("element count {0} does not fit an MPI count")]
    CountOverflow(usize),
}

#[derive(Error, Debug)]
pub enum MatmulError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{what}: expected {expected} elements, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("cannot open output sink {path}: {source}")]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("rank {0} panicked")]
    RankPanicked(usize),
}

pub type Result<T> = std::result::Result<T, MatmulError>;
