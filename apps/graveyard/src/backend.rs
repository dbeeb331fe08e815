//! # Store Backends
//!
//! Where the service reads and writes quads.
//!
//! - `sparql`: a mu-semtech SPARQL endpoint (production)
//! - `memory`: an in-process quad set, lost on exit
//! - `redb`: an embedded redb database file

use crate::archive::{LocalExecutor, QueryExecutor, SparqlExecutor};
use crate::config::Settings;
use crate::sparql::{AuthContext, SparqlClient, UserContext};
use clap::ValueEnum;
use graveyard_core::{Capability, GraveyardError, Store};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Backend selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Sparql,
    Memory,
    Redb,
}

/// An opened backend, shared by every request.
#[derive(Debug, Clone)]
pub enum Backend {
    Sparql(Arc<SparqlClient>),
    Local(Arc<Mutex<Store>>),
}

impl Backend {
    /// Open the backend selected by `kind`.
    pub fn open(kind: BackendKind, settings: &Settings, database: &Path) -> Result<Self, GraveyardError> {
        match kind {
            BackendKind::Sparql => {
                let client = SparqlClient::new(
                    settings.sparql.endpoint.clone(),
                    Duration::from_secs(settings.sparql.timeout_secs),
                )
                .map_err(|e| GraveyardError::ConfigError(e.to_string()))?;
                Ok(Self::Sparql(Arc::new(client)))
            }
            BackendKind::Memory => Ok(Self::local(Store::in_memory())),
            BackendKind::Redb => Ok(Self::local(Store::open(database)?)),
        }
    }

    /// Wrap a local store.
    pub fn local(store: Store) -> Self {
        Self::Local(Arc::new(Mutex::new(store)))
    }

    /// Short name for logs and health output.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Sparql(_) => "sparql",
            Backend::Local(_) => "local",
        }
    }

    /// The local store, if this backend has one.
    pub fn store(&self) -> Option<&Arc<Mutex<Store>>> {
        match self {
            Backend::Local(store) => Some(store),
            Backend::Sparql(_) => None,
        }
    }

    /// An executor running with `capability` on behalf of `user`.
    pub fn executor(&self, capability: Capability, user: &UserContext) -> Box<dyn QueryExecutor> {
        match self {
            Backend::Sparql(client) => {
                let auth = match capability {
                    Capability::AsUser => AuthContext::User(user.clone()),
                    Capability::Privileged => AuthContext::Privileged,
                };
                Box::new(SparqlExecutor::new(client.clone(), auth))
            }
            Backend::Local(store) => Box::new(LocalExecutor::new(store.clone(), capability)),
        }
    }
}
