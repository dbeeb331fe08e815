//! In-memory quad store.

use super::QuadStore;
use crate::{GraveyardError, Iri, Quad, QuadPattern};
use std::collections::BTreeSet;

/// Kind of an observed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Deleted,
}

/// A quad-level change, as a cache watching the store would see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub quad: Quad,
}

/// Volatile quad store.
///
/// Records only effective changes: removing an absent quad or adding a
/// present one leaves no event.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    quads: BTreeSet<Quad>,
    changes: Vec<ChangeEvent>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every change recorded so far, oldest first.
    #[must_use]
    pub fn changes(&self) -> &[ChangeEvent] {
        &self.changes
    }

    /// Changes to quads with the given subject.
    pub fn changes_for_subject<'a>(
        &'a self,
        subject: &'a Iri,
    ) -> impl Iterator<Item = &'a ChangeEvent> + 'a {
        self.changes.iter().filter(move |c| c.quad.subject == *subject)
    }

    /// Drop the change log.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Check whether a quad is present.
    #[must_use]
    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains(quad)
    }
}

impl QuadStore for MemoryStore {
    fn quads_matching(&self, pattern: &QuadPattern) -> Result<Vec<Quad>, GraveyardError> {
        Ok(self
            .quads
            .iter()
            .filter(|q| pattern.matches(q))
            .cloned()
            .collect())
    }

    fn commit(&mut self, removed: &[Quad], added: &[Quad]) -> Result<(), GraveyardError> {
        for quad in removed {
            if self.quads.remove(quad) {
                self.changes.push(ChangeEvent {
                    kind: ChangeKind::Deleted,
                    quad: quad.clone(),
                });
            }
        }
        for quad in added {
            if self.quads.insert(quad.clone()) {
                self.changes.push(ChangeEvent {
                    kind: ChangeKind::Inserted,
                    quad: quad.clone(),
                });
            }
        }
        Ok(())
    }

    fn quad_count(&self) -> Result<usize, GraveyardError> {
        Ok(self.quads.len())
    }
}
