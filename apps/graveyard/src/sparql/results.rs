//! SPARQL 1.1 Query Results JSON parsing.

use super::SparqlError;
use graveyard_core::{Iri, Literal, Solution, Term};
use serde::Deserialize;
use std::collections::BTreeMap;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    results: ResultSet,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    bindings: Vec<BTreeMap<String, BoundTerm>>,
}

#[derive(Debug, Deserialize)]
struct BoundTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
    datatype: Option<String>,
}

impl BoundTerm {
    fn into_term(self) -> Result<Term, SparqlError> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Iri(Iri::new(self.value)?)),
            "bnode" => Ok(Term::Blank(self.value)),
            "literal" | "typed-literal" => {
                let literal = match (self.lang, self.datatype) {
                    (Some(lang), _) => Literal::language(self.value, &lang)?,
                    // xsd:string and simple literals are the same term.
                    (None, Some(datatype)) if datatype != XSD_STRING => {
                        Literal::typed(self.value, Iri::new(datatype)?)
                    }
                    (None, _) => Literal::plain(self.value),
                };
                Ok(Term::Literal(literal))
            }
            other => Err(SparqlError::Response(format!("unknown term type {other:?}"))),
        }
    }
}

/// Parse a results document into solutions, one per binding row.
pub fn parse_results(body: &str) -> Result<Vec<Solution>, SparqlError> {
    let document: ResultsDocument =
        serde_json::from_str(body).map_err(|e| SparqlError::Response(e.to_string()))?;

    document
        .results
        .bindings
        .into_iter()
        .map(|row| {
            let mut solution = Solution::new();
            for (variable, bound) in row {
                solution.insert(variable, bound.into_term()?);
            }
            Ok(solution)
        })
        .collect()
}
