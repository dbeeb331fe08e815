//! # Archive Statements
//!
//! Builders for every read and mutation the archive workflow issues.
//! Each function is pure: vocabulary and resolved terms in, statement out.
//!
//! | Component             | Builders                                              |
//! |-----------------------|-------------------------------------------------------|
//! | Locator               | [`locate`], [`describe`]                              |
//! | Duplicate Resolver    | [`find_duplicate`]                                    |
//! | Graph Mover           | [`remove_live_triples`], [`copy_to_graveyard`], [`relocate_references`] |
//! | Type Reclassifier     | [`reclassify`]                                        |
//! | Annotation Writer     | [`annotate`]                                          |
//! | Relationship Rewriter | [`relocate_duplicate_link`], [`redirect_references`]  |
//! | Cache Invalidator     | [`aliases`], [`touch`]                                |

use crate::sparql::{Guard, Operation, Select, Update};
use crate::{GraphScope, Iri, Literal, Quad, QuadPattern, Term, Vocabulary};
use std::collections::BTreeSet;

fn outside_graveyard(vocab: &Vocabulary) -> GraphScope {
    GraphScope::Except(vocab.graveyard_graph.clone())
}

// =============================================================================
// LOCATOR
// =============================================================================

/// Find the subject carrying `identifier` on the identifying predicate.
///
/// Searches every graph, graveyard included, so a retried archive still
/// resolves an entity whose own triples were already relocated.
#[must_use]
pub fn locate(vocab: &Vocabulary, identifier: &str) -> Select {
    Select::new(
        QuadPattern::any()
            .with_predicate(vocab.identifier_predicate.clone())
            .with_object(Literal::plain(identifier)),
    )
    .limit(1)
}

/// Read every triple the entity is the subject of.
#[must_use]
pub fn describe(subject: &Iri) -> Select {
    Select::new(QuadPattern::any().with_subject(subject.clone()))
}

// =============================================================================
// DUPLICATE RESOLVER
// =============================================================================

/// Read the entity's equivalence links, ignoring graveyard-resident copies.
///
/// Unlimited: a link from the entity to itself is not a duplicate, so the
/// caller must see every row to skip it.
#[must_use]
pub fn find_duplicate(vocab: &Vocabulary, subject: &Iri) -> Select {
    Select::new(
        QuadPattern::any()
            .with_subject(subject.clone())
            .with_predicate(vocab.equivalence_predicate.clone())
            .in_scope(outside_graveyard(vocab)),
    )
}

// =============================================================================
// GRAPH MOVER
// =============================================================================

/// Delete every live triple the entity is the subject of.
///
/// Touches live graphs only, so it can run with the requesting user's rights.
#[must_use]
pub fn remove_live_triples(vocab: &Vocabulary, subject: &Iri) -> Update {
    Update::single(Operation::Delete {
        pattern: QuadPattern::any()
            .with_subject(subject.clone())
            .in_scope(outside_graveyard(vocab)),
    })
}

/// Insert graveyard copies of the live triples among `triples`.
///
/// `triples` is what the entity looked like before its live triples were
/// removed. Triples already in the graveyard are skipped; the update is empty
/// when nothing is left to copy.
#[must_use]
pub fn copy_to_graveyard(vocab: &Vocabulary, triples: &[Quad]) -> Update {
    let copies: BTreeSet<Quad> = triples
        .iter()
        .filter(|q| q.graph != vocab.graveyard_graph)
        .map(|q| q.in_graph(&vocab.graveyard_graph))
        .collect();
    if copies.is_empty() {
        return Update::default();
    }
    Update::single(Operation::InsertData {
        quads: copies.into_iter().collect(),
    })
}

/// Relocate every triple pointing at the entity into the graveyard, verbatim.
#[must_use]
pub fn relocate_references(vocab: &Vocabulary, subject: &Iri) -> Update {
    Update::single(Operation::Move {
        pattern: QuadPattern::any()
            .with_object(subject.clone())
            .in_scope(outside_graveyard(vocab)),
        destination: vocab.graveyard_graph.clone(),
    })
}

// =============================================================================
// TYPE RECLASSIFIER
// =============================================================================

/// Swap the live class for the archived class on the graveyard copy.
#[must_use]
pub fn reclassify(vocab: &Vocabulary, subject: &Iri) -> Update {
    Update::single(Operation::RewriteObject {
        pattern: QuadPattern::any()
            .with_subject(subject.clone())
            .with_predicate(vocab.type_predicate.clone())
            .with_object(vocab.live_class.clone())
            .in_scope(GraphScope::Only(vocab.graveyard_graph.clone())),
        replacement: Term::Iri(vocab.archived_class.clone()),
    })
}

// =============================================================================
// ANNOTATION WRITER
// =============================================================================

/// Attach the archive note to the graveyard copy.
///
/// Guarded on the entity being classified in the graveyard graph, with
/// either class, so it applies whether or not reclassification already ran.
#[must_use]
pub fn annotate(vocab: &Vocabulary, subject: &Iri) -> Update {
    Update::single(Operation::InsertGuarded {
        quad: Quad::new(
            subject.clone(),
            vocab.history_note_predicate.clone(),
            Literal::plain(vocab.archive_note.clone()),
            vocab.graveyard_graph.clone(),
        ),
        guard: Guard {
            subject: subject.clone(),
            predicate: vocab.type_predicate.clone(),
            objects: vec![
                Term::Iri(vocab.live_class.clone()),
                Term::Iri(vocab.archived_class.clone()),
            ],
        },
    })
}

// =============================================================================
// RELATIONSHIP REWRITER
// =============================================================================

/// Relocate the duplicate's equivalence links and change reasons into the
/// graveyard.
///
/// The entity's own links already left with its live triples.
#[must_use]
pub fn relocate_duplicate_link(vocab: &Vocabulary, duplicate: &Iri) -> Update {
    let duplication_info = |predicate: &Iri| Operation::Move {
        pattern: QuadPattern::any()
            .with_subject(duplicate.clone())
            .with_predicate(predicate.clone())
            .in_scope(outside_graveyard(vocab)),
        destination: vocab.graveyard_graph.clone(),
    };

    Update::single(duplication_info(&vocab.equivalence_predicate))
        .then(duplication_info(&vocab.change_reason_predicate))
}

/// Point every live reference to the entity at its duplicate instead.
#[must_use]
pub fn redirect_references(vocab: &Vocabulary, subject: &Iri, duplicate: &Iri) -> Update {
    Update::single(Operation::RewriteObject {
        pattern: QuadPattern::any()
            .with_object(subject.clone())
            .in_scope(outside_graveyard(vocab)),
        replacement: Term::Iri(duplicate.clone()),
    })
}

// =============================================================================
// CACHE INVALIDATOR
// =============================================================================

/// The associated entities named by the alias-of predicate, in order and
/// without repeats.
#[must_use]
pub fn aliases(vocab: &Vocabulary, triples: &[Quad]) -> Vec<Iri> {
    let mut found: Vec<Iri> = Vec::new();
    for quad in triples {
        if quad.predicate != vocab.alias_of_predicate {
            continue;
        }
        if let Some(target) = quad.object.as_iri() {
            if !found.contains(target) {
                found.push(target.clone());
            }
        }
    }
    found
}

/// Delete and reinsert every triple of the associated entity in place.
#[must_use]
pub fn touch(associated: &Iri) -> Update {
    Update::single(Operation::Touch {
        pattern: QuadPattern::any().with_subject(associated.clone()),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s).expect("valid iri")
    }

    #[test]
    fn locate_uses_identifier_predicate_and_plain_literal() {
        let vocab = Vocabulary::default();
        let select = locate(&vocab, "abc-123");
        assert_eq!(select.limit, Some(1));
        assert_eq!(
            select.pattern.predicate.as_ref(),
            Some(&vocab.identifier_predicate)
        );
        assert_eq!(
            select.pattern.object,
            Some(Term::Literal(Literal::plain("abc-123")))
        );
        assert_eq!(select.pattern.scope, GraphScope::Any);
    }

    #[test]
    fn duplicate_lookup_skips_graveyard() {
        let vocab = Vocabulary::default();
        let select = find_duplicate(&vocab, &iri("http://example.org/e"));
        assert_eq!(
            select.pattern.scope,
            GraphScope::Except(vocab.graveyard_graph.clone())
        );
    }

    #[test]
    fn reclassify_is_scoped_to_graveyard() {
        let vocab = Vocabulary::default();
        let update = reclassify(&vocab, &iri("http://example.org/e"));
        let text = update.to_sparql();
        assert!(text.contains(&format!("GRAPH <{}>", vocab.graveyard_graph)));
        assert!(text.contains(&format!("<{}>", vocab.archived_class)));
        assert!(!text.contains("FILTER"));
    }

    #[test]
    fn duplicate_lookup_is_not_limited() {
        let vocab = Vocabulary::default();
        assert_eq!(find_duplicate(&vocab, &iri("http://example.org/e")).limit, None);
    }

    #[test]
    fn relocate_duplicate_link_moves_every_link_and_reason_of_the_duplicate() {
        let vocab = Vocabulary::default();
        let update = relocate_duplicate_link(&vocab, &iri("http://example.org/d"));
        assert_eq!(update.operations().len(), 2);
        let text = update.to_sparql();
        assert!(text.contains(&format!(
            "<http://example.org/d> <{}> ?o .",
            vocab.equivalence_predicate
        )));
        assert!(text.contains(&format!(
            "<http://example.org/d> <{}> ?o .",
            vocab.change_reason_predicate
        )));
        assert!(!text.contains("<http://example.org/e>"));
    }

    #[test]
    fn removal_never_writes_to_the_graveyard() {
        let vocab = Vocabulary::default();
        let update = remove_live_triples(&vocab, &iri("http://example.org/e"));
        assert!(matches!(update.operations(), [Operation::Delete { .. }]));
        assert!(!update.to_sparql().contains("INSERT"));
    }

    #[test]
    fn copy_skips_graveyard_resident_triples() {
        let vocab = Vocabulary::default();
        let e = iri("http://example.org/e");
        let live = iri("http://example.org/live");
        let other = iri("http://example.org/other");
        let triples = vec![
            Quad::new(e.clone(), iri("http://example.org/foo"), Literal::plain("bar"), live),
            Quad::new(e.clone(), iri("http://example.org/foo"), Literal::plain("bar"), other),
            Quad::new(
                e.clone(),
                vocab.history_note_predicate.clone(),
                Literal::plain("old"),
                vocab.graveyard_graph.clone(),
            ),
        ];

        assert_eq!(
            copy_to_graveyard(&vocab, &triples),
            Update::single(Operation::InsertData {
                quads: vec![Quad::new(
                    e,
                    iri("http://example.org/foo"),
                    Literal::plain("bar"),
                    vocab.graveyard_graph.clone()
                )],
            })
        );
    }

    #[test]
    fn copy_of_graveyard_only_entity_is_empty() {
        let vocab = Vocabulary::default();
        let triples = vec![Quad::new(
            iri("http://example.org/e"),
            iri("http://example.org/foo"),
            Literal::plain("bar"),
            vocab.graveyard_graph.clone(),
        )];
        assert!(copy_to_graveyard(&vocab, &triples).is_empty());
    }

    #[test]
    fn aliases_dedupes_and_ignores_literals() {
        let vocab = Vocabulary::default();
        let e = iri("http://example.org/e");
        let g = iri("http://example.org/live");
        let person = iri("http://example.org/person");
        let triples = vec![
            Quad::new(e.clone(), vocab.alias_of_predicate.clone(), person.clone(), g.clone()),
            Quad::new(e.clone(), vocab.alias_of_predicate.clone(), person.clone(), g.clone()),
            Quad::new(e.clone(), vocab.alias_of_predicate.clone(), Literal::plain("x"), g.clone()),
            Quad::new(e, iri("http://example.org/foo"), iri("http://example.org/other"), g),
        ];
        assert_eq!(aliases(&vocab, &triples), vec![person]);
    }
}
