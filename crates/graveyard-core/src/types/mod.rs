//! # Core Type Definitions
//!
//! This module contains the linked-data model the graveyard works on:
//! - Identifiers (`Iri`)
//! - Object terms (`Literal`, `LiteralKind`, `Term`)
//! - Placed statements (`Quad`)
//! - Selection (`GraphScope`, `QuadPattern`)
//! - Error types (`GraveyardError`)
//!
//! ## Value Semantics
//!
//! Quads are immutable values. Changing a statement means removing one quad
//! and adding another; nothing in this crate edits a quad in place.
//! All types implement `Ord` so stores can keep them in `BTreeSet`s.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IRI
// =============================================================================

/// An absolute IRI naming a resource, predicate, class or graph.
///
/// Construction through [`Iri::new`] (and deserialization) only checks that the
/// value is non-empty and carries a scheme. Characters that are illegal inside
/// `<...>` are handled by the escaper, not rejected here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Create a validated IRI.
    pub fn new(value: impl Into<String>) -> Result<Self, GraveyardError> {
        let value = value.into();
        let has_scheme = value
            .split_once(':')
            .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(is_scheme_char));
        if !has_scheme {
            return Err(GraveyardError::InvalidIri(value));
        }
        Ok(Self(value))
    }

    /// Create an IRI from a value the caller knows to be well formed.
    ///
    /// Used for the built-in vocabulary defaults.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the IRI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

impl TryFrom<String> for Iri {
    type Error = GraveyardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LITERALS
// =============================================================================

/// How a literal's lexical form is qualified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    /// A simple string literal.
    Plain,
    /// A literal with an explicit datatype.
    Typed(Iri),
    /// A language-tagged string.
    Language(String),
}

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// The lexical form.
    pub value: String,
    /// Datatype or language qualification.
    pub kind: LiteralKind,
}

/// XSD namespace used by the typed-literal helpers.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

impl Literal {
    /// A plain string literal.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Plain,
        }
    }

    /// A literal with an explicit datatype.
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Typed(datatype),
        }
    }

    /// A language-tagged literal. The tag must follow BCP 47 shape
    /// (`en`, `nl-BE`, ...).
    pub fn language(value: impl Into<String>, tag: &str) -> Result<Self, GraveyardError> {
        if !is_language_tag(tag) {
            return Err(GraveyardError::InvalidLanguageTag(tag.to_string()));
        }
        Ok(Self {
            value: value.into(),
            kind: LiteralKind::Language(tag.to_string()),
        })
    }

    /// An `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), Iri::new_unchecked(format!("{XSD}integer")))
    }

    /// An `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), Iri::new_unchecked(format!("{XSD}boolean")))
    }
}

/// Check the shape of a language tag: alphabetic primary subtag, then
/// alphanumeric subtags separated by `-`.
#[must_use]
pub fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

// =============================================================================
// TERM
// =============================================================================

/// The object position of a quad.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A resource reference.
    Iri(Iri),
    /// A literal value.
    Literal(Literal),
    /// A blank node label as reported by the store.
    Blank(String),
}

impl Term {
    /// Get the IRI if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

// =============================================================================
// QUAD
// =============================================================================

/// A triple placed in a named graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
    pub graph: Iri,
}

impl Quad {
    /// Create a new quad.
    #[must_use]
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Term>, graph: Iri) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
            graph,
        }
    }

    /// The same statement placed in another graph.
    #[must_use]
    pub fn in_graph(&self, graph: &Iri) -> Self {
        Self {
            graph: graph.clone(),
            ..self.clone()
        }
    }

    /// The same subject, predicate and graph with a different object.
    #[must_use]
    pub fn with_object(&self, object: &Term) -> Self {
        Self {
            object: object.clone(),
            ..self.clone()
        }
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// Which named graphs a pattern may match in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GraphScope {
    /// Every graph.
    #[default]
    Any,
    /// Exactly this graph.
    Only(Iri),
    /// Every graph except this one.
    Except(Iri),
}

impl GraphScope {
    /// Check whether a graph falls inside this scope.
    #[must_use]
    pub fn admits(&self, graph: &Iri) -> bool {
        match self {
            GraphScope::Any => true,
            GraphScope::Only(only) => only == graph,
            GraphScope::Except(excluded) => excluded != graph,
        }
    }
}

/// A single quad pattern. `None` positions are variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuadPattern {
    pub subject: Option<Iri>,
    pub predicate: Option<Iri>,
    pub object: Option<Term>,
    pub scope: GraphScope,
}

impl QuadPattern {
    /// A pattern matching every quad in every graph.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Bind the subject position.
    #[must_use]
    pub fn with_subject(mut self, subject: Iri) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Bind the predicate position.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Iri) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Bind the object position.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Restrict the graphs the pattern matches in.
    #[must_use]
    pub fn in_scope(mut self, scope: GraphScope) -> Self {
        self.scope = scope;
        self
    }

    /// Check whether a quad matches every bound position and the graph scope.
    #[must_use]
    pub fn matches(&self, quad: &Quad) -> bool {
        self.subject.as_ref().is_none_or(|s| *s == quad.subject)
            && self.predicate.as_ref().is_none_or(|p| *p == quad.predicate)
            && self.object.as_ref().is_none_or(|o| *o == quad.object)
            && self.scope.admits(&quad.graph)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the graveyard core.
///
/// The core never panics; every failure surfaces as one of these.
#[derive(Debug, Error)]
pub enum GraveyardError {
    /// A value could not be used as an IRI.
    #[error("Invalid IRI: {0:?}")]
    InvalidIri(String),

    /// A language tag does not have BCP 47 shape.
    #[error("Invalid language tag: {0:?}")]
    InvalidLanguageTag(String),

    /// A query solution is missing a variable or binds it to the wrong kind of term.
    #[error("Unusable binding for ?{variable}: {reason}")]
    Binding {
        variable: &'static str,
        reason: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The local store failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// An archive run did not complete.
    #[error("Archive failed: {0}")]
    ArchiveFailed(String),
}

// =============================================================================
// TESTS
// =============================================================================
