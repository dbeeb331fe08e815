//! # SPARQL Statements
//!
//! Structured reads ([`Select`]) and mutations ([`Update`]) with their
//! SPARQL 1.1 text rendering.
//!
//! The same values are evaluated directly by the local stores (see
//! [`crate::store`]), so the SPARQL backend and the local backends share one
//! definition of what every step does.

use crate::escape::{escape_iri, escape_term};
use crate::{GraphScope, GraveyardError, Iri, Quad, QuadPattern, Term};
use std::collections::BTreeMap;

/// Variable bound to the subject position.
pub const SUBJECT_VAR: &str = "s";
/// Variable bound to the predicate position.
pub const PREDICATE_VAR: &str = "p";
/// Variable bound to the object position.
pub const OBJECT_VAR: &str = "o";
/// Variable bound to the graph.
pub const GRAPH_VAR: &str = "g";

/// Variable used by guarded inserts.
const GUARD_VAR: &str = "guard";

// =============================================================================
// PATTERN RENDERING
// =============================================================================

fn subject_text(pattern: &QuadPattern) -> String {
    pattern
        .subject
        .as_ref()
        .map_or_else(|| format!("?{SUBJECT_VAR}"), escape_iri)
}

fn predicate_text(pattern: &QuadPattern) -> String {
    pattern
        .predicate
        .as_ref()
        .map_or_else(|| format!("?{PREDICATE_VAR}"), escape_iri)
}

fn object_text(pattern: &QuadPattern) -> String {
    pattern
        .object
        .as_ref()
        .map_or_else(|| format!("?{OBJECT_VAR}"), escape_term)
}

fn graph_text(scope: &GraphScope) -> String {
    match scope {
        GraphScope::Only(graph) => escape_iri(graph),
        GraphScope::Any | GraphScope::Except(_) => format!("?{GRAPH_VAR}"),
    }
}

fn scope_filter(scope: &GraphScope) -> Option<String> {
    match scope {
        GraphScope::Except(graph) => Some(format!("FILTER (?{GRAPH_VAR} != {})", escape_iri(graph))),
        GraphScope::Any | GraphScope::Only(_) => None,
    }
}

fn triple_text(pattern: &QuadPattern, object: &str) -> String {
    format!(
        "{} {} {} .",
        subject_text(pattern),
        predicate_text(pattern),
        object
    )
}

fn where_clause(pattern: &QuadPattern) -> String {
    let mut out = format!(
        "WHERE {{\n  GRAPH {} {{\n    {}\n  }}\n",
        graph_text(&pattern.scope),
        triple_text(pattern, &object_text(pattern))
    );
    if let Some(filter) = scope_filter(&pattern.scope) {
        out.push_str(&format!("  {filter}\n"));
    }
    out.push('}');
    out
}

// =============================================================================
// SELECT
// =============================================================================

/// A read over a single quad pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub pattern: QuadPattern,
    pub limit: Option<usize>,
}

impl Select {
    /// Select every match of a pattern.
    #[must_use]
    pub fn new(pattern: QuadPattern) -> Self {
        Self {
            pattern,
            limit: None,
        }
    }

    /// Cap the number of solutions.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The variables this select projects, in projection order.
    #[must_use]
    pub fn variables(&self) -> Vec<&'static str> {
        let mut vars = Vec::with_capacity(4);
        if self.pattern.subject.is_none() {
            vars.push(SUBJECT_VAR);
        }
        if self.pattern.predicate.is_none() {
            vars.push(PREDICATE_VAR);
        }
        if self.pattern.object.is_none() {
            vars.push(OBJECT_VAR);
        }
        if !matches!(self.pattern.scope, GraphScope::Only(_)) {
            vars.push(GRAPH_VAR);
        }
        vars
    }

    /// Render as SPARQL text.
    #[must_use]
    pub fn to_sparql(&self) -> String {
        let projection: Vec<String> = self.variables().iter().map(|v| format!("?{v}")).collect();
        let projection = if projection.is_empty() {
            "*".to_string()
        } else {
            projection.join(" ")
        };
        let mut out = format!(
            "SELECT DISTINCT {projection}\n{}",
            where_clause(&self.pattern)
        );
        if let Some(limit) = self.limit {
            out.push_str(&format!("\nLIMIT {limit}"));
        }
        out
    }

    /// Complete a solution into the quad it describes, taking bound positions
    /// from the pattern and the rest from the solution.
    pub fn bind(&self, solution: &Solution) -> Result<Quad, GraveyardError> {
        let subject = match &self.pattern.subject {
            Some(subject) => subject.clone(),
            None => solution.iri(SUBJECT_VAR)?,
        };
        let predicate = match &self.pattern.predicate {
            Some(predicate) => predicate.clone(),
            None => solution.iri(PREDICATE_VAR)?,
        };
        let object = match &self.pattern.object {
            Some(object) => object.clone(),
            None => solution.term(OBJECT_VAR)?.clone(),
        };
        let graph = match &self.pattern.scope {
            GraphScope::Only(graph) => graph.clone(),
            GraphScope::Any | GraphScope::Except(_) => solution.iri(GRAPH_VAR)?,
        };
        Ok(Quad {
            subject,
            predicate,
            object,
            graph,
        })
    }
}

/// One row of a select result: variable name to term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution(BTreeMap<String, Term>);

impl Solution {
    /// Create an empty solution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable.
    pub fn insert(&mut self, variable: impl Into<String>, term: Term) {
        self.0.insert(variable.into(), term);
    }

    /// Get the term bound to a variable.
    pub fn term(&self, variable: &'static str) -> Result<&Term, GraveyardError> {
        self.0.get(variable).ok_or(GraveyardError::Binding {
            variable,
            reason: "unbound".to_string(),
        })
    }

    /// Get the IRI bound to a variable.
    pub fn iri(&self, variable: &'static str) -> Result<Iri, GraveyardError> {
        match self.term(variable)? {
            Term::Iri(iri) => Ok(iri.clone()),
            other => Err(GraveyardError::Binding {
                variable,
                reason: format!("expected an IRI, got {other:?}"),
            }),
        }
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// Condition for a guarded insert: `subject predicate ?guard` must hold in the
/// insert's graph with `?guard` among `objects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub subject: Iri,
    pub predicate: Iri,
    pub objects: Vec<Term>,
}

/// A single mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Remove every match of the pattern.
    Delete { pattern: QuadPattern },
    /// Insert the given quads as they are.
    InsertData { quads: Vec<Quad> },
    /// Relocate every match of the pattern into `destination`.
    Move {
        pattern: QuadPattern,
        destination: Iri,
    },
    /// Replace the object of every match, keeping subject, predicate and graph.
    RewriteObject {
        pattern: QuadPattern,
        replacement: Term,
    },
    /// Insert one quad if the guard holds in the quad's graph.
    InsertGuarded { quad: Quad, guard: Guard },
    /// Delete and reinsert every match in place.
    Touch { pattern: QuadPattern },
}

impl Operation {
    /// Render as SPARQL text.
    #[must_use]
    pub fn to_sparql(&self) -> String {
        match self {
            Operation::Delete { pattern } => {
                format!(
                    "DELETE {{\n  GRAPH {} {{\n    {}\n  }}\n}}\n{}",
                    graph_text(&pattern.scope),
                    triple_text(pattern, &object_text(pattern)),
                    where_clause(pattern)
                )
            }
            Operation::InsertData { quads } => {
                let mut by_graph: BTreeMap<&Iri, Vec<String>> = BTreeMap::new();
                for quad in quads {
                    by_graph.entry(&quad.graph).or_default().push(format!(
                        "{} {} {} .",
                        escape_iri(&quad.subject),
                        escape_iri(&quad.predicate),
                        escape_term(&quad.object)
                    ));
                }
                let blocks: Vec<String> = by_graph
                    .into_iter()
                    .map(|(graph, triples)| {
                        format!(
                            "  GRAPH {} {{\n    {}\n  }}",
                            escape_iri(graph),
                            triples.join("\n    ")
                        )
                    })
                    .collect();
                format!("INSERT DATA {{\n{}\n}}", blocks.join("\n"))
            }
            Operation::Move {
                pattern,
                destination,
            } => {
                let triple = triple_text(pattern, &object_text(pattern));
                format!(
                    "DELETE {{\n  GRAPH {} {{\n    {triple}\n  }}\n}}\nINSERT {{\n  GRAPH {} {{\n    {triple}\n  }}\n}}\n{}",
                    graph_text(&pattern.scope),
                    escape_iri(destination),
                    where_clause(pattern)
                )
            }
            Operation::RewriteObject {
                pattern,
                replacement,
            } => {
                let graph = graph_text(&pattern.scope);
                format!(
                    "DELETE {{\n  GRAPH {graph} {{\n    {}\n  }}\n}}\nINSERT {{\n  GRAPH {graph} {{\n    {}\n  }}\n}}\n{}",
                    triple_text(pattern, &object_text(pattern)),
                    triple_text(pattern, &escape_term(replacement)),
                    where_clause(pattern)
                )
            }
            Operation::InsertGuarded { quad, guard } => {
                let graph = escape_iri(&quad.graph);
                let allowed: Vec<String> = guard.objects.iter().map(escape_term).collect();
                format!(
                    "INSERT {{\n  GRAPH {graph} {{\n    {} {} {} .\n  }}\n}}\nWHERE {{\n  GRAPH {graph} {{\n    {} {} ?{GUARD_VAR} .\n  }}\n  VALUES ?{GUARD_VAR} {{ {} }}\n}}",
                    escape_iri(&quad.subject),
                    escape_iri(&quad.predicate),
                    escape_term(&quad.object),
                    escape_iri(&guard.subject),
                    escape_iri(&guard.predicate),
                    allowed.join(" ")
                )
            }
            Operation::Touch { pattern } => {
                let graph = graph_text(&pattern.scope);
                let triple = triple_text(pattern, &object_text(pattern));
                format!(
                    "DELETE {{\n  GRAPH {graph} {{\n    {triple}\n  }}\n}}\nINSERT {{\n  GRAPH {graph} {{\n    {triple}\n  }}\n}}\n{}",
                    where_clause(pattern)
                )
            }
        }
    }
}

/// A request of one or more operations, executed in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Update {
    operations: Vec<Operation>,
}

impl Update {
    /// An update consisting of a single operation.
    #[must_use]
    pub fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
        }
    }

    /// Append an operation.
    #[must_use]
    pub fn then(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// The operations in execution order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Check if the update does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Render as SPARQL text. Operations are separated by `;`.
    #[must_use]
    pub fn to_sparql(&self) -> String {
        self.operations
            .iter()
            .map(Operation::to_sparql)
            .collect::<Vec<_>>()
            .join(" ;\n\n")
    }
}

// =============================================================================
// TESTS
// =============================================================================
