//! # Archive Vocabulary
//!
//! The fixed terms the archive workflow reads and writes, bundled as a value
//! handed to the workflow at construction.
//!
//! Defaults follow the LBLOD mandate vocabulary. Every field can be
//! overridden from the `[vocabulary]` settings section.

use crate::Iri;
use serde::{Deserialize, Serialize};

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// `owl:sameAs`.
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
/// `skos:changeNote`.
pub const SKOS_CHANGE_NOTE: &str = "http://www.w3.org/2004/02/skos/core#changeNote";
/// `skos:historyNote`.
pub const SKOS_HISTORY_NOTE: &str = "http://www.w3.org/2004/02/skos/core#historyNote";
/// `mu:uuid`.
pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";
/// `mandaat:Mandataris`.
pub const MANDATARIS: &str = "http://data.vlaanderen.be/ns/mandaat#Mandataris";
/// `mandaat:isBestuurlijkeAliasVan`.
pub const IS_BESTUURLIJKE_ALIAS_VAN: &str =
    "http://data.vlaanderen.be/ns/mandaat#isBestuurlijkeAliasVan";
/// Class given to archived mandate holders.
pub const ARCHIVED_MANDATARIS: &str =
    "http://lblod.data.gift/vocabularies/mandaat/ArchivedMandataris";
/// Graph receiving archived mandate holders.
pub const GRAVEYARD_GRAPH: &str = "http://mu.semte.ch/graphs/graveyard/mandatarissen";
/// Historical note attached to every archived record.
pub const ARCHIVE_NOTE: &str = "Has been archived due to deletion in Loket.";

/// Terms used by the archive workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Destination graph for archived records.
    pub graveyard_graph: Iri,
    /// Class of an active mandate holder.
    pub live_class: Iri,
    /// Class of an archived mandate holder.
    pub archived_class: Iri,
    /// Predicate carrying the external identifier.
    pub identifier_predicate: Iri,
    /// Classification predicate.
    pub type_predicate: Iri,
    /// Equivalence link to a duplicate record.
    pub equivalence_predicate: Iri,
    /// Reason attached to an equivalence link.
    pub change_reason_predicate: Iri,
    /// Predicate of the archiving annotation.
    pub history_note_predicate: Iri,
    /// Link to the associated entity whose cache gets invalidated.
    pub alias_of_predicate: Iri,
    /// Text of the archiving annotation.
    pub archive_note: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            graveyard_graph: Iri::new_unchecked(GRAVEYARD_GRAPH),
            live_class: Iri::new_unchecked(MANDATARIS),
            archived_class: Iri::new_unchecked(ARCHIVED_MANDATARIS),
            identifier_predicate: Iri::new_unchecked(MU_UUID),
            type_predicate: Iri::new_unchecked(RDF_TYPE),
            equivalence_predicate: Iri::new_unchecked(OWL_SAME_AS),
            change_reason_predicate: Iri::new_unchecked(SKOS_CHANGE_NOTE),
            history_note_predicate: Iri::new_unchecked(SKOS_HISTORY_NOTE),
            alias_of_predicate: Iri::new_unchecked(IS_BESTUURLIJKE_ALIAS_VAN),
            archive_note: ARCHIVE_NOTE.to_string(),
        }
    }
}
