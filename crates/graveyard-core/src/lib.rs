//! # graveyard-core
//!
//! The synchronous model of the graveyard service - THE MODEL.
//!
//! This crate describes how a mandate holder record is archived: which
//! statements are issued, in which order, with which capability. It never
//! talks to a network; the service crate drives it.
//!
//! ## Layout
//!
//! - `types`: IRIs, literals, terms, quads and patterns
//! - `escape`: SPARQL term escaping
//! - `sparql`: structured selects and updates with their text rendering
//! - `vocabulary`: the terms the workflow reads and writes
//! - `statements`: one builder per workflow component
//! - `workflow`: the archive state machine and execution plan
//! - `store`: local quad stores that evaluate statements in-process
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Deterministic: the same inputs render the same query text
//! - Never panics; failures surface as [`GraveyardError`]

// =============================================================================
// MODULES
// =============================================================================

pub mod escape;
pub mod sparql;
pub mod statements;
pub mod store;
pub mod types;
pub mod vocabulary;
pub mod workflow;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    GraphScope, GraveyardError, Iri, Literal, LiteralKind, Quad, QuadPattern, Term,
    is_language_tag,
};

// =============================================================================
// RE-EXPORTS: Statements and Workflow
// =============================================================================

pub use sparql::{Guard, Operation, Select, Solution, Update};
pub use vocabulary::Vocabulary;
pub use workflow::{
    ArchiveState, Capability, DenialPolicy, ExecutionPlan, Step, StepOutcome, StepRecord,
};

// =============================================================================
// RE-EXPORTS: Local Stores
// =============================================================================

pub use store::{ChangeEvent, ChangeKind, MemoryStore, QuadStore, RedbStore, Store};
