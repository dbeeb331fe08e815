//! # redb-backed Quad Storage
//!
//! A disk-backed quad store using the redb embedded database, for running the
//! service against local data without a SPARQL endpoint.
//!
//! Quads are postcard-encoded and stored as keys. The subject is the first
//! encoded field, so subject-bound patterns become prefix range scans.

use super::QuadStore;
use crate::{GraveyardError, Quad, QuadPattern};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for quads: postcard-encoded quad -> ()
const QUADS: TableDefinition<&[u8], ()> = TableDefinition::new("quads");

fn storage_err(e: impl std::fmt::Display) -> GraveyardError {
    GraveyardError::StorageError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GraveyardError> {
    postcard::to_allocvec(value).map_err(|e| GraveyardError::SerializationError(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Quad, GraveyardError> {
    postcard::from_bytes(bytes).map_err(|e| GraveyardError::SerializationError(e.to_string()))
}

/// A disk-backed quad store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraveyardError> {
        let db = Database::create(path.as_ref())
            .map_err(|e| GraveyardError::IoError(e.to_string()))?;

        // Create the table up front so readers never hit a missing table.
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(QUADS).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self { db })
    }
}

impl QuadStore for RedbStore {
    fn quads_matching(&self, pattern: &QuadPattern) -> Result<Vec<Quad>, GraveyardError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(QUADS).map_err(storage_err)?;

        let mut found = Vec::new();
        match &pattern.subject {
            Some(subject) => {
                let prefix = encode(subject)?;
                for entry in table.range(prefix.as_slice()..).map_err(storage_err)? {
                    let (key, _) = entry.map_err(storage_err)?;
                    if !key.value().starts_with(&prefix) {
                        break;
                    }
                    let quad = decode(key.value())?;
                    if pattern.matches(&quad) {
                        found.push(quad);
                    }
                }
            }
            None => {
                for entry in table.iter().map_err(storage_err)? {
                    let (key, _) = entry.map_err(storage_err)?;
                    let quad = decode(key.value())?;
                    if pattern.matches(&quad) {
                        found.push(quad);
                    }
                }
            }
        }
        Ok(found)
    }

    fn commit(&mut self, removed: &[Quad], added: &[Quad]) -> Result<(), GraveyardError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(QUADS).map_err(storage_err)?;
            for quad in removed {
                let key = encode(quad)?;
                table.remove(key.as_slice()).map_err(storage_err)?;
            }
            for quad in added {
                let key = encode(quad)?;
                table.insert(key.as_slice(), ()).map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)
    }

    fn quad_count(&self) -> Result<usize, GraveyardError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(QUADS).map_err(storage_err)?;
        let len = table.len().map_err(storage_err)?;
        Ok(len as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
