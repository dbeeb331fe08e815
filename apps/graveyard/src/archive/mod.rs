//! # Archive Workflow
//!
//! The orchestrator and the executors it runs statements through.

mod executor;
mod local;
mod orchestrator;

pub use executor::{ExecutorError, QueryExecutor, SparqlExecutor};
pub use local::LocalExecutor;
pub use orchestrator::{ArchiveError, ArchiveFailure, ArchiveReport, Archiver};
