pub mod config;
pub mod coordinator;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod partition;
pub mod report;
pub mod runner;
pub mod transport;
pub mod worker;

pub use config::{Dimensions, InputSource, RunConfig, TransportKind};
pub use coordinator::{Coordinator, Product};
pub use error::{MatmulError, Result};
pub use matrix::{Element, Matrix};
pub use partition::Partition;
pub use runner::{run_rank, RankOutcome};
pub use transport::{Collective, LocalUniverse, LocalWorld};
pub use worker::{PassStats, Worker};
