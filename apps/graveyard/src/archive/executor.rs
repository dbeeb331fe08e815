//! # Query Executors
//!
//! One interface, two capability levels. The orchestrator holds an as-user
//! and a privileged instance and picks one per step from the execution plan.

use crate::sparql::{AuthContext, SparqlClient, SparqlError};
use async_trait::async_trait;
use graveyard_core::{Capability, GraveyardError, Quad, Select, Update};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while executing a statement.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The SPARQL endpoint failed.
    #[error(transparent)]
    Sparql(#[from] SparqlError),

    /// The local store failed.
    #[error(transparent)]
    Store(#[from] GraveyardError),

    /// The store no longer holds data an earlier step relied on.
    #[error("Unexpected store state: {0}")]
    Inconsistent(String),
}

/// Runs reads and writes under one authorization context.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// The capability this executor runs with.
    fn capability(&self) -> Capability;

    /// Run a select and return the matching quads.
    async fn read(&self, query: &Select) -> Result<Vec<Quad>, ExecutorError>;

    /// Run an update. `Ok(false)` means the store did not acknowledge it.
    async fn write(&self, update: &Update) -> Result<bool, ExecutorError>;
}

// =============================================================================
// SPARQL EXECUTOR
// =============================================================================

/// Executor backed by a SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct SparqlExecutor {
    client: Arc<SparqlClient>,
    auth: AuthContext,
}

impl SparqlExecutor {
    /// Create an executor running under `auth`.
    pub fn new(client: Arc<SparqlClient>, auth: AuthContext) -> Self {
        Self { client, auth }
    }
}

#[async_trait]
impl QueryExecutor for SparqlExecutor {
    fn capability(&self) -> Capability {
        match self.auth {
            AuthContext::User(_) => Capability::AsUser,
            AuthContext::Privileged => Capability::Privileged,
        }
    }

    async fn read(&self, query: &Select) -> Result<Vec<Quad>, ExecutorError> {
        let solutions = self.client.query(&self.auth, query.to_sparql()).await?;
        solutions
            .iter()
            .map(|solution| query.bind(solution).map_err(ExecutorError::from))
            .collect()
    }

    async fn write(&self, update: &Update) -> Result<bool, ExecutorError> {
        if update.is_empty() {
            return Ok(true);
        }
        Ok(self.client.update(&self.auth, update.to_sparql()).await?)
    }
}
