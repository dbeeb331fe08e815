//! # SPARQL Term Escaping
//!
//! Serializes terms into SPARQL query text.
//!
//! Every value that ends up inside a statement goes through one of these
//! functions; statement rendering never concatenates raw user input.

use crate::{Iri, Literal, LiteralKind, Term};

/// Characters that may not appear inside `<...>` in SPARQL.
const IRI_FORBIDDEN: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\'];

/// Serialize an IRI as `<...>`, percent-encoding characters the
/// IRIREF production forbids.
#[must_use]
pub fn escape_iri(iri: &Iri) -> String {
    let mut out = String::with_capacity(iri.as_str().len() + 2);
    out.push('<');
    for c in iri.as_str().chars() {
        if c <= ' ' || IRI_FORBIDDEN.contains(&c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

/// Serialize a string as a double-quoted SPARQL string literal.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Serialize a literal with its datatype or language tag.
#[must_use]
pub fn escape_literal(literal: &Literal) -> String {
    let lexical = escape_string(&literal.value);
    match &literal.kind {
        LiteralKind::Plain => lexical,
        LiteralKind::Typed(datatype) => format!("{lexical}^^{}", escape_iri(datatype)),
        LiteralKind::Language(tag) => {
            // Tags are validated on construction; anything else is dropped
            // rather than spliced into the query.
            let tag: String = tag
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            format!("{lexical}@{tag}")
        }
    }
}

/// Serialize any term.
#[must_use]
pub fn escape_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => escape_iri(iri),
        Term::Literal(literal) => escape_literal(literal),
        Term::Blank(label) => {
            let label: String = label
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
                .collect();
            format!("_:{label}")
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
