//! # Local Quad Stores
//!
//! In-process stand-ins for the triple store, evaluating the same structured
//! statements the SPARQL backend renders to text.
//!
//! ## Backends
//!
//! - `InMemory`: a `BTreeSet` of quads with a change-event log
//! - `Persistent`: a redb database, one write transaction per operation
//!
//! ## Evaluation Semantics
//!
//! Every operation follows SPARQL `DELETE/INSERT ... WHERE`: matches are
//! computed first, then all deletions, then all insertions. Operations of one
//! [`Update`] run in order and each sees the effect of the previous one.

mod memory;
mod redb_store;

pub use memory::{ChangeEvent, ChangeKind, MemoryStore};
pub use redb_store::RedbStore;

use crate::sparql::{Operation, Select, Update};
use crate::{GraphScope, GraveyardError, Quad, QuadPattern};
use std::path::Path;

// =============================================================================
// QUADSTORE TRAIT
// =============================================================================

/// Primitive operations a local store provides.
pub trait QuadStore {
    /// Every quad matching the pattern, in store order.
    fn quads_matching(&self, pattern: &QuadPattern) -> Result<Vec<Quad>, GraveyardError>;

    /// Remove `removed`, then add `added`, as one unit.
    fn commit(&mut self, removed: &[Quad], added: &[Quad]) -> Result<(), GraveyardError>;

    /// Total number of quads.
    fn quad_count(&self) -> Result<usize, GraveyardError>;
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Run a select against a store.
pub fn select(store: &impl QuadStore, query: &Select) -> Result<Vec<Quad>, GraveyardError> {
    let mut found = store.quads_matching(&query.pattern)?;
    if let Some(limit) = query.limit {
        found.truncate(limit);
    }
    Ok(found)
}

/// Apply an update to a store.
pub fn apply(store: &mut impl QuadStore, update: &Update) -> Result<(), GraveyardError> {
    for operation in update.operations() {
        let (removed, added) = plan(store, operation)?;
        if removed.is_empty() && added.is_empty() {
            continue;
        }
        store.commit(&removed, &added)?;
    }
    Ok(())
}

/// Work out what one operation removes and adds.
fn plan(
    store: &impl QuadStore,
    operation: &Operation,
) -> Result<(Vec<Quad>, Vec<Quad>), GraveyardError> {
    match operation {
        Operation::Delete { pattern } => Ok((store.quads_matching(pattern)?, Vec::new())),
        Operation::InsertData { quads } => Ok((Vec::new(), quads.clone())),
        Operation::Move {
            pattern,
            destination,
        } => {
            let matched = store.quads_matching(pattern)?;
            let added = matched.iter().map(|q| q.in_graph(destination)).collect();
            Ok((matched, added))
        }
        Operation::RewriteObject {
            pattern,
            replacement,
        } => {
            let matched = store.quads_matching(pattern)?;
            let added = matched.iter().map(|q| q.with_object(replacement)).collect();
            Ok((matched, added))
        }
        Operation::InsertGuarded { quad, guard } => {
            let guard_pattern = QuadPattern::any()
                .with_subject(guard.subject.clone())
                .with_predicate(guard.predicate.clone())
                .in_scope(GraphScope::Only(quad.graph.clone()));
            let holds = store
                .quads_matching(&guard_pattern)?
                .iter()
                .any(|q| guard.objects.contains(&q.object));
            let added = if holds { vec![quad.clone()] } else { Vec::new() };
            Ok((Vec::new(), added))
        }
        Operation::Touch { pattern } => {
            let matched = store.quads_matching(pattern)?;
            Ok((matched.clone(), matched))
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// A local store backend.
#[derive(Debug)]
pub enum Store {
    /// In-memory quads (volatile).
    InMemory(MemoryStore),
    /// Disk-backed quads using redb.
    Persistent(RedbStore),
}

impl Default for Store {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl Store {
    /// A fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open or create a redb-backed store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraveyardError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Add quads directly, bypassing statement evaluation.
    pub fn load(&mut self, quads: &[Quad]) -> Result<(), GraveyardError> {
        self.commit(&[], quads)
    }

    /// Every quad in the store.
    pub fn all(&self) -> Result<Vec<Quad>, GraveyardError> {
        self.quads_matching(&QuadPattern::any())
    }
}

impl QuadStore for Store {
    fn quads_matching(&self, pattern: &QuadPattern) -> Result<Vec<Quad>, GraveyardError> {
        match self {
            Store::InMemory(store) => store.quads_matching(pattern),
            Store::Persistent(store) => store.quads_matching(pattern),
        }
    }

    fn commit(&mut self, removed: &[Quad], added: &[Quad]) -> Result<(), GraveyardError> {
        match self {
            Store::InMemory(store) => store.commit(removed, added),
            Store::Persistent(store) => store.commit(removed, added),
        }
    }

    fn quad_count(&self) -> Result<usize, GraveyardError> {
        match self {
            Store::InMemory(store) => store.quad_count(),
            Store::Persistent(store) => store.quad_count(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
