//! Executor over a local quad store.
//!
//! Local stores have no access control: both capabilities see everything
//! and every write is acknowledged.

use super::executor::{ExecutorError, QueryExecutor};
use async_trait::async_trait;
use graveyard_core::store::{apply, select};
use graveyard_core::{Capability, Quad, Select, Store, Update};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Executor evaluating statements against a shared local store.
///
/// The lock is held for one statement only, never across steps.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    store: Arc<Mutex<Store>>,
    capability: Capability,
}

impl LocalExecutor {
    pub fn new(store: Arc<Mutex<Store>>, capability: Capability) -> Self {
        Self { store, capability }
    }
}

#[async_trait]
impl QueryExecutor for LocalExecutor {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn read(&self, query: &Select) -> Result<Vec<Quad>, ExecutorError> {
        let store = self.store.lock().await;
        Ok(select(&*store, query)?)
    }

    async fn write(&self, update: &Update) -> Result<bool, ExecutorError> {
        let mut store = self.store.lock().await;
        apply(&mut *store, update)?;
        Ok(true)
    }
}
